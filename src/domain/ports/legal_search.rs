//! Port for the vector/legal-text search interface.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::LegalPassage;

/// Free-text search over the legal document corpus, returning ranked
/// passages with similarity scores. Fallible: agents calling this must
/// degrade on error instead of propagating.
#[async_trait]
pub trait LegalSearch: Send + Sync {
    async fn search(&self, text: &str, limit: usize) -> DomainResult<Vec<LegalPassage>>;
}
