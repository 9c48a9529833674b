//! Query and response models for the pipeline's request/response contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable user query. Created once per request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Raw query text as typed by the user.
    pub text: String,
    /// Conversation session, when the caller keeps one.
    pub session_id: Option<String>,
    /// Caller role (citizen, analyst, admin), informational only.
    pub user_role: Option<String>,
    /// Preferred LLM model hint passed through to the synthesizer.
    pub model: Option<String>,
    /// Skip the answer cache for this request.
    pub bypass_cache: bool,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
            user_role: None,
            model: None,
            bypass_cache: false,
        }
    }

    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn bypassing_cache(mut self) -> Self {
        self.bypass_cache = true;
        self
    }
}

/// Pipeline stages recorded in the agent trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    CacheLookup,
    CacheHit,
    ContextAnalysis,
    Clarification,
    Routing,
    AgentExecution,
    Reranking,
    Validation,
    Refinement,
    Synthesis,
    CacheAdmission,
    SessionAppend,
    PipelineError,
}

impl PipelineStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheLookup => "cache_lookup",
            Self::CacheHit => "cache_hit",
            Self::ContextAnalysis => "context_analysis",
            Self::Clarification => "clarification",
            Self::Routing => "routing",
            Self::AgentExecution => "agent_execution",
            Self::Reranking => "reranking",
            Self::Validation => "validation",
            Self::Refinement => "refinement",
            Self::Synthesis => "synthesis",
            Self::CacheAdmission => "cache_admission",
            Self::SessionAppend => "session_append",
            Self::PipelineError => "pipeline_error",
        }
    }
}

/// Status of a trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

/// One time-ordered entry of the decision path, sufficient for external
/// observability tooling to reconstruct what the pipeline did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub step: PipelineStep,
    pub timestamp: DateTime<Utc>,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl TraceEvent {
    pub fn new(step: PipelineStep, status: StepStatus) -> Self {
        Self {
            step,
            timestamp: Utc::now(),
            status,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Where the pieces of the final answer came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sources {
    pub cached: bool,
    pub tabular: usize,
    pub conceptual: usize,
}

/// Overall outcome of a pipeline run. `Error` is only used for total
/// pipeline failure; degraded answers still report `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// The single synchronous response contract exposed by the pipeline.
///
/// Always well-formed: callers never see a raw error, worst case is the
/// fixed low-confidence fallback text with `status == Error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub response: String,
    pub confidence: f64,
    pub sources: Sources,
    pub execution_time_ms: u64,
    pub agent_trace: Vec<TraceEvent>,
    pub status: ResponseStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_sets_fields() {
        let query = Query::new("o que posso construir no cristal")
            .with_session("s-1")
            .bypassing_cache();

        assert_eq!(query.session_id.as_deref(), Some("s-1"));
        assert!(query.bypass_cache);
        assert!(query.model.is_none());
    }

    #[test]
    fn trace_event_serializes_step_names() {
        let event = TraceEvent::new(PipelineStep::AgentExecution, StepStatus::Started);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["step"], "agent_execution");
        assert_eq!(json["status"], "started");
    }
}
