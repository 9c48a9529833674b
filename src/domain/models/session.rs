//! Append-only session memory turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One conversation turn in a session. Never updated or deleted.
///
/// `turn_number` is assigned by re-reading the session's current maximum
/// immediately before insert; a duplicate produced by a concurrent writer
/// is a logged anomaly, not a fatal error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTurn {
    pub id: Uuid,
    pub session_id: String,
    pub turn_number: i64,
    pub query: String,
    /// Serialized analyzer context for this turn.
    pub context: Value,
    /// Serialized agent results for this turn.
    pub agent_results: Value,
    pub response: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl SessionTurn {
    pub fn new(
        session_id: impl Into<String>,
        turn_number: i64,
        query: impl Into<String>,
        context: Value,
        agent_results: Value,
        response: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.into(),
            turn_number,
            query: query.into(),
            context,
            agent_results,
            response: response.into(),
            confidence,
            created_at: Utc::now(),
        }
    }
}
