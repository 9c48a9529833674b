//! Port for the keyed answer-cache storage.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::CacheEntry;

/// Keyed storage behind the answer cache.
///
/// Lookup and admission are plain read-then-write operations; concurrent
/// requests for the same key may both miss and both build, and `upsert` is
/// last-writer-wins on the key. That duplication is an accepted cost.
#[async_trait]
pub trait CacheRepository: Send + Sync {
    async fn get(&self, key: &str) -> DomainResult<Option<CacheEntry>>;

    /// Increment hit count and refresh the last-accessed timestamp.
    async fn record_hit(&self, key: &str) -> DomainResult<()>;

    /// Insert or replace the entry for its key.
    async fn upsert(&self, entry: &CacheEntry) -> DomainResult<()>;

    async fn entry_count(&self) -> DomainResult<i64>;
}
