//! SQLite implementation of the CacheRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CacheEntry;
use crate::domain::ports::CacheRepository;

#[derive(Clone)]
pub struct SqliteCacheRepository {
    pool: SqlitePool,
}

impl SqliteCacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheRepository for SqliteCacheRepository {
    async fn get(&self, key: &str) -> DomainResult<Option<CacheEntry>> {
        let row: Option<CacheRow> = sqlx::query_as(
            "SELECT key, query, response, confidence, category, hit_count, \
             created_at, last_accessed_at FROM query_cache WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn record_hit(&self, key: &str) -> DomainResult<()> {
        sqlx::query(
            "UPDATE query_cache SET hit_count = hit_count + 1, last_accessed_at = ? \
             WHERE key = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert(&self, entry: &CacheEntry) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO query_cache (key, query, response, confidence, category,
               hit_count, created_at, last_accessed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   query = excluded.query,
                   response = excluded.response,
                   confidence = excluded.confidence,
                   category = excluded.category,
                   last_accessed_at = excluded.last_accessed_at"#,
        )
        .bind(&entry.key)
        .bind(&entry.query)
        .bind(&entry.response)
        .bind(entry.confidence)
        .bind(&entry.category)
        .bind(entry.hit_count)
        .bind(entry.created_at.to_rfc3339())
        .bind(entry.last_accessed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn entry_count(&self) -> DomainResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM query_cache")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct CacheRow {
    key: String,
    query: String,
    response: String,
    confidence: f64,
    category: String,
    hit_count: i64,
    created_at: String,
    last_accessed_at: String,
}

impl TryFrom<CacheRow> for CacheEntry {
    type Error = DomainError;

    fn try_from(row: CacheRow) -> Result<Self, Self::Error> {
        Ok(CacheEntry {
            key: row.key,
            query: row.query,
            response: row.response,
            confidence: row.confidence,
            category: row.category,
            hit_count: row.hit_count,
            created_at: super::parse_datetime(&row.created_at)?,
            last_accessed_at: super::parse_datetime(&row.last_accessed_at)?,
        })
    }
}
