//! SQLite implementation of the SessionRepository.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::SessionTurn;
use crate::domain::ports::SessionRepository;

#[derive(Clone)]
pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn append(&self, turn: &SessionTurn) -> DomainResult<()> {
        let context_json = serde_json::to_string(&turn.context)?;
        let results_json = serde_json::to_string(&turn.agent_results)?;

        sqlx::query(
            r#"INSERT INTO session_memory (id, session_id, turn_number, query, context,
               agent_results, response, confidence, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(&turn.session_id)
        .bind(turn.turn_number)
        .bind(&turn.query)
        .bind(&context_json)
        .bind(&results_json)
        .bind(&turn.response)
        .bind(turn.confidence)
        .bind(turn.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn max_turn_number(&self, session_id: &str) -> DomainResult<i64> {
        let (max,): (Option<i64>,) = sqlx::query_as(
            "SELECT MAX(turn_number) FROM session_memory WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(max.unwrap_or(0))
    }

    async fn recent_turns(
        &self,
        session_id: &str,
        limit: usize,
    ) -> DomainResult<Vec<SessionTurn>> {
        let rows: Vec<TurnRow> = sqlx::query_as(
            "SELECT id, session_id, turn_number, query, context, agent_results, \
             response, confidence, created_at FROM session_memory \
             WHERE session_id = ? ORDER BY turn_number DESC LIMIT ?",
        )
        .bind(session_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct TurnRow {
    id: String,
    session_id: String,
    turn_number: i64,
    query: String,
    context: String,
    agent_results: String,
    response: String,
    confidence: f64,
    created_at: String,
}

impl TryFrom<TurnRow> for SessionTurn {
    type Error = DomainError;

    fn try_from(row: TurnRow) -> Result<Self, Self::Error> {
        let context: Value = serde_json::from_str(&row.context)?;
        let agent_results: Value = serde_json::from_str(&row.agent_results)?;
        Ok(SessionTurn {
            id: super::parse_uuid(&row.id)?,
            session_id: row.session_id,
            turn_number: row.turn_number,
            query: row.query,
            context,
            agent_results,
            response: row.response,
            confidence: row.confidence,
            created_at: super::parse_datetime(&row.created_at)?,
        })
    }
}
