//! Domain errors for the query orchestration pipeline.

use thiserror::Error;

/// Domain-level errors that can occur while serving a query.
///
/// Upstream failures (relational store, vector search, LLM) are recovered
/// locally by the calling agent and never cross the orchestrator boundary;
/// these variants exist for the ports and adapters underneath the agents.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Upstream dependency unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("LLM call failed: {0}")]
    LlmError(String),

    #[error("Malformed LLM output: {0}")]
    MalformedLlmOutput(String),

    #[error("Context analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("No agents could be routed for this query")]
    EmptyRoute,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::UpstreamUnavailable(err.to_string())
    }
}
