//! Answer cache over the keyed repository: normalized-query lookup with a
//! strict admission policy.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::models::{CacheEntry, Context, Intent, CONFIDENCE_FLOOR};
use crate::domain::ports::CacheRepository;
use crate::services::synthesizer::{FALLBACK_RESPONSE, LOW_CONFIDENCE_DISCLAIMER};
use crate::services::text::cache_key;

pub struct AnswerCache {
    repository: Arc<dyn CacheRepository>,
}

impl AnswerCache {
    pub fn new(repository: Arc<dyn CacheRepository>) -> Self {
        Self { repository }
    }

    /// Look up a cached answer for the query. A hit records its access;
    /// repository failures degrade to a miss.
    pub async fn lookup(&self, query: &str) -> Option<CacheEntry> {
        let key = cache_key(query);
        match self.repository.get(&key).await {
            Ok(Some(entry)) if entry.confidence >= CONFIDENCE_FLOOR => {
                if let Err(err) = self.repository.record_hit(&key).await {
                    warn!(error = %err, %key, "failed to record cache hit");
                }
                debug!(%key, "cache hit");
                Some(entry)
            }
            Ok(Some(entry)) => {
                // Entries below the floor are left to be overwritten.
                debug!(%key, confidence = entry.confidence, "cache entry below floor");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, %key, "cache lookup failed");
                None
            }
        }
    }

    /// Admit a synthesized answer. Rejects anything below the confidence
    /// floor and every fallback/disclaimer/clarification template; a
    /// repository failure is logged and swallowed.
    pub async fn admit(&self, query: &str, ctx: &Context, response: &str, confidence: f64) {
        if !admissible(ctx, response, confidence) {
            debug!("answer not admissible to cache");
            return;
        }

        let entry = CacheEntry::new(
            cache_key(query),
            query,
            response,
            confidence,
            category_for(ctx),
        );
        if let Err(err) = self.repository.upsert(&entry).await {
            warn!(error = %err, key = %entry.key, "cache admission failed");
        }
    }
}

fn admissible(ctx: &Context, response: &str, confidence: f64) -> bool {
    confidence >= CONFIDENCE_FLOOR
        && ctx.needs_clarification.is_none()
        && !response.contains(FALLBACK_RESPONSE)
        && !response.contains(LOW_CONFIDENCE_DISCLAIMER.trim())
}

fn category_for(ctx: &Context) -> &'static str {
    if ctx.is_counting_query {
        "counting"
    } else if ctx.is_construction_query {
        "construction"
    } else if ctx.is_risk_query {
        "risk"
    } else {
        match ctx.intent {
            Intent::Conceptual => "conceptual",
            Intent::Tabular => "tabular",
            Intent::Hybrid => "hybrid",
            Intent::Predefined => "predefined",
        }
    }
}
