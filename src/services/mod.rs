//! Service layer: the pipeline stages and their shared helpers.
//!
//! - `text` / `gazetteer`: normalization and entity matching primitives
//! - `context_analyzer`: intent/entity/strategy classification
//! - `agent_router`: deterministic context-to-route mapping
//! - `agents`: the retrieval specialists
//! - `reranker` / `result_validator`: scoring and consistency checks
//! - `synthesizer`: final answer composition
//! - `answer_cache` / `session_memory`: persistence-facing services

pub mod agent_router;
pub mod agents;
pub mod answer_cache;
pub mod context_analyzer;
pub mod gazetteer;
pub mod reranker;
pub mod result_validator;
pub mod session_memory;
pub mod synthesizer;
pub mod text;

pub use agents::{Agent, AgentRegistry};
pub use answer_cache::AnswerCache;
pub use context_analyzer::ContextAnalyzer;
pub use session_memory::SessionMemory;
pub use synthesizer::Synthesizer;
