#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;

use urbanista::adapters::sqlite::{
    create_test_pool, SqliteCacheRepository, SqliteRegulationStore, SqliteSessionRepository,
};
use urbanista::application::QueryPipeline;
use urbanista::domain::errors::{DomainError, DomainResult};
use urbanista::domain::models::{Config, LegalPassage};
use urbanista::domain::ports::{Completion, CompletionRequest, LegalSearch, LlmClient};

/// LLM stub: fixed completion text and classification payload, or errors
/// when unset.
pub struct StubLlm {
    pub completion_text: Option<String>,
    pub classification: Option<Value>,
}

impl StubLlm {
    pub fn answering(text: &str) -> Self {
        Self {
            completion_text: Some(text.to_string()),
            classification: Some(serde_json::json!({})),
        }
    }

    pub fn failing() -> Self {
        Self {
            completion_text: None,
            classification: None,
        }
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, request: CompletionRequest) -> DomainResult<Completion> {
        match &self.completion_text {
            Some(text) => Ok(Completion {
                text: text.clone(),
                confidence: None,
                model: request.model.unwrap_or_else(|| "stub".to_string()),
            }),
            None => Err(DomainError::LlmError("stub completion disabled".to_string())),
        }
    }

    async fn classify(&self, _system: &str, _user: &str) -> DomainResult<Value> {
        match &self.classification {
            Some(value) => Ok(value.clone()),
            None => Err(DomainError::LlmError("stub classify disabled".to_string())),
        }
    }
}

/// Legal search stub: fixed passages, optional failure or artificial delay.
pub struct StubSearch {
    pub passages: Vec<LegalPassage>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl StubSearch {
    pub fn empty() -> Self {
        Self {
            passages: Vec::new(),
            fail: false,
            delay: None,
        }
    }

    pub fn with_passages(passages: Vec<LegalPassage>) -> Self {
        Self {
            passages,
            fail: false,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            passages: Vec::new(),
            fail: true,
            delay: None,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            passages: Vec::new(),
            fail: false,
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl LegalSearch for StubSearch {
    async fn search(&self, _text: &str, limit: usize) -> DomainResult<Vec<LegalPassage>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(DomainError::UpstreamUnavailable(
                "stub search disabled".to_string(),
            ));
        }
        Ok(self.passages.iter().take(limit).cloned().collect())
    }
}

pub fn passage(content: &str, similarity: f64) -> LegalPassage {
    LegalPassage {
        content: content.to_string(),
        similarity,
        article: None,
        source: None,
    }
}

/// In-memory database with migrations applied and regulation fixtures
/// seeded.
pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool().await.expect("failed to create test pool");
    seed_regulation_data(&pool).await;
    pool
}

async fn seed_regulation_data(pool: &SqlitePool) {
    let regime_rows = [
        ("CRISTAL", "ZOT 05", 42.0, 1.3, 2.0, 75.0),
        ("TRÊS FIGUEIRAS", "ZOT 08.3B", 60.0, 1.5, 2.4, 66.0),
        ("PETRÓPOLIS", "ZOT 07", 52.0, 1.3, 2.2, 70.0),
        ("PETRÓPOLIS", "ZOT 08", 90.0, 1.9, 3.0, 80.0),
    ];
    for (bairro, zona, altura, ca_basico, ca_maximo, taxa) in regime_rows {
        sqlx::query(
            "INSERT INTO regime_urbanistico (bairro, zona, altura_maxima, \
             coef_aproveitamento_basico, coef_aproveitamento_maximo, taxa_ocupacao) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(bairro)
        .bind(zona)
        .bind(altura)
        .bind(ca_basico)
        .bind(ca_maximo)
        .bind(taxa)
        .execute(pool)
        .await
        .expect("failed to seed regime row");
    }

    let zone_rows = [
        ("CRISTAL", "ZOT 05", 1),
        ("TRÊS FIGUEIRAS", "ZOT 08.3B", 1),
        ("PETRÓPOLIS", "ZOT 07", 2),
        ("PETRÓPOLIS", "ZOT 08", 2),
    ];
    for (bairro, zona, total) in zone_rows {
        sqlx::query(
            "INSERT INTO zots_bairros (bairro, zona, total_zonas_no_bairro) VALUES (?, ?, ?)",
        )
        .bind(bairro)
        .bind(zona)
        .bind(total)
        .execute(pool)
        .await
        .expect("failed to seed zone row");
    }

    sqlx::query("INSERT INTO bairros_risco (bairro, nivel_risco, tipo_risco) VALUES (?, ?, ?)")
        .bind("CRISTAL")
        .bind("alto")
        .bind("inundação")
        .execute(pool)
        .await
        .expect("failed to seed risk row");
}

/// Wire a pipeline over the given pool and stubs.
pub fn build_pipeline(
    pool: &SqlitePool,
    llm: StubLlm,
    search: StubSearch,
    config: &Config,
) -> QueryPipeline {
    QueryPipeline::new(
        Arc::new(SqliteRegulationStore::new(pool.clone())),
        Arc::new(search),
        Arc::new(llm),
        Arc::new(SqliteCacheRepository::new(pool.clone())),
        Arc::new(SqliteSessionRepository::new(pool.clone())),
        config,
    )
}

/// Default test configuration: short agent timeout, cache enabled.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.pipeline.agent_timeout_secs = 1;
    config
}
