//! Urbanista - Municipal Urban Planning Q&A Pipeline
//!
//! Query orchestration pipeline answering natural-language questions about
//! a municipal master plan: zoning parameters, legal articles, disaster
//! risk and conceptual definitions.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure models, port traits and errors
//! - **Service Layer** (`services`): Pipeline stages (analysis, routing,
//!   agents, reranking, validation, synthesis)
//! - **Application Layer** (`application`): The query pipeline itself
//! - **Adapters** (`adapters`): SQLite, HTTP and configuration
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use urbanista::application::QueryPipeline;
//! use urbanista::domain::models::Query;
//!
//! # async fn run(pipeline: QueryPipeline) {
//! let response = pipeline.handle(Query::new("altura máxima no cristal")).await;
//! println!("{}", response.response);
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::config::{ConfigError, ConfigLoader};
pub use application::QueryPipeline;
pub use domain::models::{
    Config, Context, PipelineResponse, Query, ResponseStatus, Sources,
};
pub use domain::ports::{
    CacheRepository, LegalSearch, LlmClient, RegulationStore, SessionRepository,
};
