//! HTTP adapters for the external LLM and vector search ports.

pub mod llm;
pub mod vector_search;

pub use llm::OpenAiClient;
pub use vector_search::HttpLegalSearch;
