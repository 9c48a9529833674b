//! Agent result envelope and per-agent payload variants.
//!
//! The original system passed free-form key/value bags between agents; here
//! each agent kind carries a typed payload so the reranker and synthesizer
//! can pattern-match exhaustively instead of probing for field presence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::regulation::{LegalPassage, RegimeRow, RiskRow, ZoneMembership};
use super::route::AgentKind;

/// Node in the small knowledge graph built from structured results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: String,
    pub label: String,
}

/// Directed edge between two graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl GraphEdge {
    /// Human-readable sentence used by the fallback composer.
    pub fn sentence(&self) -> String {
        format!(
            "{} {} {}.",
            self.source,
            self.relation.to_lowercase().replace('_', " "),
            self.target
        )
    }
}

/// Typed payload per agent kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentPayload {
    Structured {
        response: String,
        rows: Vec<RegimeRow>,
        memberships: Vec<ZoneMembership>,
        /// Result of a counting/aggregation query, when one was asked.
        count: Option<i64>,
    },
    Legal {
        response: String,
        citations: Vec<String>,
        laws: Vec<String>,
        passages: Vec<LegalPassage>,
    },
    Geographic {
        response: String,
        out_of_jurisdiction: bool,
    },
    Calculator {
        response: String,
        value: Option<f64>,
        formula: Option<String>,
    },
    Graph {
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        risks: Vec<RiskRow>,
    },
    Conceptual {
        response: String,
        passages: Vec<LegalPassage>,
    },
    Validator {
        valid: bool,
        issues: Vec<String>,
        available_domains: Vec<String>,
    },
}

impl AgentPayload {
    /// Best-effort text rendering of the payload for synthesis prompts.
    pub fn response_text(&self) -> Option<&str> {
        match self {
            Self::Structured { response, .. }
            | Self::Legal { response, .. }
            | Self::Geographic { response, .. }
            | Self::Calculator { response, .. }
            | Self::Conceptual { response, .. } => Some(response),
            Self::Graph { .. } | Self::Validator { .. } => None,
        }
    }

    /// Number of meaningfully populated fields, for the completeness score.
    pub fn populated_fields(&self) -> usize {
        match self {
            Self::Structured {
                response,
                rows,
                memberships,
                count,
            } => {
                usize::from(!response.is_empty())
                    + usize::from(!rows.is_empty())
                    + usize::from(!memberships.is_empty())
                    + usize::from(count.is_some())
                    + rows.iter().map(RegimeRow::populated_fields).sum::<usize>()
            }
            Self::Legal {
                response,
                citations,
                laws,
                passages,
            } => {
                usize::from(!response.is_empty())
                    + citations.len()
                    + laws.len()
                    + passages.len()
            }
            Self::Geographic { response, .. } => usize::from(!response.is_empty()) + 1,
            Self::Calculator {
                response,
                value,
                formula,
            } => {
                usize::from(!response.is_empty())
                    + usize::from(value.is_some())
                    + usize::from(formula.is_some())
            }
            Self::Graph { nodes, edges, risks } => nodes.len() + edges.len() + risks.len(),
            Self::Conceptual { response, passages } => {
                usize::from(!response.is_empty()) + passages.len()
            }
            Self::Validator {
                issues,
                available_domains,
                ..
            } => 1 + issues.len() + available_domains.len(),
        }
    }

    /// Whether the payload contains empty collections or blank text where
    /// data was expected.
    pub fn has_empty_values(&self) -> bool {
        match self {
            Self::Structured { rows, memberships, count, .. } => {
                rows.is_empty() && memberships.is_empty() && count.is_none()
            }
            Self::Legal { citations, passages, .. } => {
                citations.is_empty() && passages.is_empty()
            }
            Self::Geographic { response, .. } => response.is_empty(),
            Self::Calculator { value, formula, .. } => value.is_none() && formula.is_none(),
            Self::Graph { nodes, edges, .. } => nodes.is_empty() && edges.is_empty(),
            Self::Conceptual { passages, .. } => passages.is_empty(),
            Self::Validator { available_domains, .. } => available_domains.is_empty(),
        }
    }

    /// Empty payload of the right shape for a degraded result.
    pub fn degraded(kind: AgentKind, note: &str) -> Self {
        match kind {
            AgentKind::Structured => Self::Structured {
                response: note.to_string(),
                rows: Vec::new(),
                memberships: Vec::new(),
                count: None,
            },
            AgentKind::Legal => Self::Legal {
                response: note.to_string(),
                citations: Vec::new(),
                laws: Vec::new(),
                passages: Vec::new(),
            },
            AgentKind::Geographic => Self::Geographic {
                response: note.to_string(),
                out_of_jurisdiction: false,
            },
            AgentKind::Calculator => Self::Calculator {
                response: note.to_string(),
                value: None,
                formula: None,
            },
            AgentKind::KnowledgeGraph => Self::Graph {
                nodes: Vec::new(),
                edges: Vec::new(),
                risks: Vec::new(),
            },
            AgentKind::Conceptual => Self::Conceptual {
                response: note.to_string(),
                passages: Vec::new(),
            },
            AgentKind::Validator => Self::Validator {
                valid: false,
                issues: vec![note.to_string()],
                available_domains: Vec::new(),
            },
        }
    }
}

/// Result of one agent invocation. Produced once, never mutated after
/// return; results of the same kind across refinement rounds stay separate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub kind: AgentKind,
    /// Self-reported confidence in `[0, 1]`.
    pub confidence: f64,
    pub payload: AgentPayload,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl AgentResult {
    pub fn new(kind: AgentKind, confidence: f64, payload: AgentPayload) -> Self {
        Self {
            kind,
            confidence: confidence.clamp(0.0, 1.0),
            payload,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Low-confidence heuristic result used when an agent's downstream
    /// dependency failed or its call timed out.
    pub fn degraded(kind: AgentKind, note: &str) -> Self {
        Self::new(kind, 0.3, AgentPayload::degraded(kind, note))
            .with_metadata("degraded", "true")
    }

    pub fn is_degraded(&self) -> bool {
        self.metadata.get("degraded").is_some_and(|v| v == "true")
    }
}
