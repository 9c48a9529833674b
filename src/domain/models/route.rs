//! Agent routing model.

use serde::{Deserialize, Serialize};

/// The specialized retrieval agents the router can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Regulation/zoning relational store lookups.
    Structured,
    /// Legal-concept and legal-text retrieval.
    Legal,
    /// Population/location trivia, out-of-jurisdiction detection.
    Geographic,
    /// Arithmetic over retrieved numeric fields.
    Calculator,
    /// Neighborhood → zone → risk entity graph.
    KnowledgeGraph,
    /// Definition/explanation passages via vector search.
    Conceptual,
    /// Capability coverage check for the query.
    Validator,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Legal => "legal",
            Self::Geographic => "geographic",
            Self::Calculator => "calculator",
            Self::KnowledgeGraph => "knowledge_graph",
            Self::Conceptual => "conceptual",
            Self::Validator => "validator",
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority assigned to a routed agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPriority {
    Medium,
    High,
    Critical,
}

impl AgentPriority {
    /// Score used by the reranker's priority criterion.
    pub fn score(&self) -> f64 {
        match self {
            Self::Critical => 1.0,
            Self::High => 0.8,
            Self::Medium => 0.5,
        }
    }
}

/// Ordered list of agents to invoke, derived deterministically from Context.
///
/// The validator agent is always present at critical priority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Route {
    pub entries: Vec<(AgentKind, AgentPriority)>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent unless it is already routed. The first priority wins.
    pub fn push(&mut self, kind: AgentKind, priority: AgentPriority) {
        if !self.contains(kind) {
            self.entries.push((kind, priority));
        }
    }

    /// Add an agent, upgrading its priority if already routed lower.
    pub fn force(&mut self, kind: AgentKind, priority: AgentPriority) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == kind) {
            if entry.1 < priority {
                entry.1 = priority;
            }
        } else {
            self.entries.push((kind, priority));
        }
    }

    pub fn contains(&self, kind: AgentKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn agent_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }
}
