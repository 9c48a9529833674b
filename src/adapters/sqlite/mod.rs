//! SQLite adapters for the persistence-facing ports.

pub mod cache_repository;
pub mod connection;
pub mod regulation_store;
pub mod session_repository;

pub use cache_repository::SqliteCacheRepository;
pub use connection::{create_pool, create_test_pool, run_migrations};
pub use regulation_store::SqliteRegulationStore;
pub use session_repository::SqliteSessionRepository;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Parse a UUID string from a SQLite row field.
pub(crate) fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| DomainError::DatabaseError(format!("invalid UUID '{s}': {e}")))
}

/// Parse an RFC 3339 timestamp from a SQLite row field.
pub(crate) fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::DatabaseError(format!("invalid timestamp '{s}': {e}")))
}
