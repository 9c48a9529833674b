//! Port for the append-only session memory.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::SessionTurn;

/// Append-only per-session turn log.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert one turn. Never updates existing rows.
    async fn append(&self, turn: &SessionTurn) -> DomainResult<()>;

    /// Current maximum turn number for the session, 0 when empty.
    async fn max_turn_number(&self, session_id: &str) -> DomainResult<i64>;

    /// Last `limit` turns in reverse chronological order.
    async fn recent_turns(&self, session_id: &str, limit: usize)
        -> DomainResult<Vec<SessionTurn>>;
}
