//! Session memory service: append-only turn log with best-effort writes.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::domain::models::{Context, SessionTurn};
use crate::domain::ports::SessionRepository;

pub struct SessionMemory {
    repository: Arc<dyn SessionRepository>,
    history_limit: usize,
}

impl SessionMemory {
    pub fn new(repository: Arc<dyn SessionRepository>, history_limit: usize) -> Self {
        Self {
            repository,
            history_limit,
        }
    }

    /// Last turns of the session, newest first. Failures degrade to an
    /// empty history.
    pub async fn history(&self, session_id: &str) -> Vec<SessionTurn> {
        match self
            .repository
            .recent_turns(session_id, self.history_limit)
            .await
        {
            Ok(turns) => turns,
            Err(err) => {
                warn!(error = %err, session_id, "session history read failed");
                Vec::new()
            }
        }
    }

    /// Append the completed turn. The turn number is re-read immediately
    /// before insert; a duplicate produced by a concurrent writer is a
    /// logged anomaly. Never fatal to the request.
    pub async fn append(
        &self,
        session_id: &str,
        ctx: &Context,
        agent_results: Value,
        response: &str,
        confidence: f64,
    ) {
        let turn_number = match self.repository.max_turn_number(session_id).await {
            Ok(max) => max + 1,
            Err(err) => {
                warn!(error = %err, session_id, "session turn numbering failed, skipping append");
                return;
            }
        };

        let context = match serde_json::to_value(ctx) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "context serialization failed, storing null");
                Value::Null
            }
        };

        let turn = SessionTurn::new(
            session_id,
            turn_number,
            &ctx.original_query,
            context,
            agent_results,
            response,
            confidence,
        );
        if let Err(err) = self.repository.append(&turn).await {
            warn!(error = %err, session_id, turn_number, "session append failed");
        }
    }
}
