//! Domain models for the query orchestration pipeline.

pub mod agent;
pub mod cache;
pub mod config;
pub mod context;
pub mod query;
pub mod ranking;
pub mod regulation;
pub mod route;
pub mod session;
pub mod validation;

pub use agent::{AgentPayload, AgentResult, GraphEdge, GraphNode};
pub use cache::CacheEntry;
pub use config::{
    Config, DatabaseConfig, LlmConfig, LoggingConfig, PipelineConfig, SearchConfig,
};
pub use context::{Complexity, Context, DatasetId, Entities, Intent, Signals, Strategy};
pub use query::{
    PipelineResponse, PipelineStep, Query, ResponseStatus, Sources, StepStatus, TraceEvent,
};
pub use ranking::{CriteriaScores, RankedResult};
pub use regulation::{Capabilities, LegalPassage, RegimeRow, RiskRow, ZoneMembership};
pub use route::{AgentKind, AgentPriority, Route};
pub use session::SessionTurn;
pub use validation::{ValidationResult, CONFIDENCE_FLOOR};
