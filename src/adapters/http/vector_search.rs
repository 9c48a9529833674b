//! HTTP client for the legal-text vector search service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{LegalPassage, SearchConfig};
use crate::domain::ports::LegalSearch;

pub struct HttpLegalSearch {
    http_client: ReqwestClient,
    base_url: String,
    match_threshold: f64,
}

impl HttpLegalSearch {
    pub fn new(config: &SearchConfig) -> DomainResult<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DomainError::UpstreamUnavailable(format!("search client build failed: {e}"))
            })?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            match_threshold: config.match_threshold,
        })
    }
}

#[async_trait]
impl LegalSearch for HttpLegalSearch {
    async fn search(&self, text: &str, limit: usize) -> DomainResult<Vec<LegalPassage>> {
        let body = MatchRequest {
            query: text,
            match_threshold: self.match_threshold,
            match_count: limit,
        };

        let response = self
            .http_client
            .post(format!("{}/match_document_sections", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::UpstreamUnavailable(format!(
                "search failed with status {status}"
            )));
        }

        let matches: Vec<MatchRow> = response.json().await?;
        Ok(matches
            .into_iter()
            .map(|m| LegalPassage {
                content: m.content,
                similarity: m.similarity,
                article: m.article,
                source: m.source,
            })
            .collect())
    }
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query: &'a str,
    match_threshold: f64,
    match_count: usize,
}

#[derive(Deserialize)]
struct MatchRow {
    content: String,
    similarity: f64,
    #[serde(default)]
    article: Option<String>,
    #[serde(default)]
    source: Option<String>,
}
