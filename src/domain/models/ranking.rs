//! Ranked results: agent results scored by the multi-criteria reranker.

use serde::{Deserialize, Serialize};

use super::agent::AgentResult;

/// Fixed weights of the reranker's linear combination.
pub const WEIGHT_CONFIDENCE: f64 = 0.25;
pub const WEIGHT_PRIORITY: f64 = 0.20;
pub const WEIGHT_RELEVANCE: f64 = 0.25;
pub const WEIGHT_COMPLETENESS: f64 = 0.15;
pub const WEIGHT_AUTHORITY: f64 = 0.15;

/// Per-criterion scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CriteriaScores {
    pub confidence: f64,
    pub priority: f64,
    pub relevance: f64,
    pub completeness: f64,
    pub authority: f64,
}

impl CriteriaScores {
    /// Weighted sum defining the ranking order.
    pub fn final_score(&self) -> f64 {
        self.confidence * WEIGHT_CONFIDENCE
            + self.priority * WEIGHT_PRIORITY
            + self.relevance * WEIGHT_RELEVANCE
            + self.completeness * WEIGHT_COMPLETENESS
            + self.authority * WEIGHT_AUTHORITY
    }
}

/// An agent result plus its criteria scores and final weighted score.
///
/// Ordering is by descending `final_score`; ties keep the original agent
/// invocation order (the reranker uses a stable sort).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub result: AgentResult,
    pub scores: CriteriaScores,
    pub final_score: f64,
}

impl RankedResult {
    pub fn new(result: AgentResult, scores: CriteriaScores) -> Self {
        let final_score = scores.final_score();
        Self {
            result,
            scores,
            final_score,
        }
    }
}
