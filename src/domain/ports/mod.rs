//! Port trait definitions (Hexagonal Architecture).
//!
//! Async trait interfaces the adapters implement:
//! - `RegulationStore`: structured regulation / zone mapping / risk reads
//! - `LegalSearch`: vector search over the legal text corpus
//! - `LlmClient`: external completion and classification calls
//! - `CacheRepository`: keyed answer-cache storage
//! - `SessionRepository`: append-only session memory
//!
//! These contracts keep the pipeline independent of the concrete
//! infrastructure behind it.

pub mod cache_repository;
pub mod legal_search;
pub mod llm_client;
pub mod regulation_store;
pub mod session_repository;

pub use cache_repository::CacheRepository;
pub use legal_search::LegalSearch;
pub use llm_client::{ChatMessage, Completion, CompletionRequest, LlmClient, MessageRole};
pub use regulation_store::RegulationStore;
pub use session_repository::SessionRepository;
