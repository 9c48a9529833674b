//! Cached answer entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cached (query → answer) pair, keyed by the normalized-query hash.
///
/// Admission invariant: entries exist only for synthesized answers with
/// confidence at or above the floor that are not fallback/error templates.
/// The pipeline mutates hit metadata in place and never deletes entries;
/// expiry is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    /// Original query text kept for inspection and pattern invalidation.
    pub query: String,
    pub response: String,
    pub confidence: f64,
    pub category: String,
    pub hit_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        key: impl Into<String>,
        query: impl Into<String>,
        response: impl Into<String>,
        confidence: f64,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            key: key.into(),
            query: query.into(),
            response: response.into(),
            confidence,
            category: category.into(),
            hit_count: 0,
            created_at: now,
            last_accessed_at: now,
        }
    }
}
