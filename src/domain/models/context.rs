//! Query context: intent, entities and processing strategy.
//!
//! A `Context` is derived once per query by the context analyzer and is
//! immutable afterwards. The refinement controller derives a second context
//! from it rather than mutating the first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Classified intent of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Conceptual/textual information about the plan.
    Conceptual,
    /// Specific data from the regulation tables.
    Tabular,
    /// Both tabular and conceptual data.
    Hybrid,
    /// Canned answer (plan objectives), bypasses all later stages.
    Predefined,
}

/// Processing strategy decided by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    StructuredOnly,
    UnstructuredOnly,
    Hybrid,
    Predefined,
}

/// Identifiers for the datasets the pipeline can require.
///
/// The original system addressed these by opaque spreadsheet ids; a typed
/// enum lets the router and agents match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetId {
    /// Canonical structured-regulation table (per-zone numeric parameters).
    UrbanRegime,
    /// Zone to neighborhood mapping table.
    ZoneNeighborhoods,
    /// Legal text corpus served by vector search.
    DocumentSections,
    /// Disaster risk classification per neighborhood.
    DisasterRisk,
}

impl DatasetId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrbanRegime => "regime_urbanistico",
            Self::ZoneNeighborhoods => "zots_bairros",
            Self::DocumentSections => "document_sections",
            Self::DisasterRisk => "bairros_risco",
        }
    }
}

/// Entities extracted from the query text, case-normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    /// Zone codes in canonical `ZOT NN[.N][A|B|C]` form.
    pub zones: BTreeSet<String>,
    /// Neighborhood names in canonical uppercase form.
    pub neighborhoods: BTreeSet<String>,
    /// Urbanistic parameter names (altura, coeficiente, ...).
    pub parameters: BTreeSet<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.neighborhoods.is_empty() && self.parameters.is_empty()
    }
}

/// Keyword signals computed locally by the analyzer, consumed by the router.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Signals {
    pub has_legal_signals: bool,
    pub has_location_signals: bool,
    pub has_parameter_signals: bool,
    pub wants_definition: bool,
    pub wants_calculation: bool,
}

/// Query complexity classification used for knowledge-graph routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Analyzer output. Created once per query; immutable thereafter.
///
/// Invariant: `is_construction_query` implies `strategy == StructuredOnly`
/// and `required_datasets` contains [`DatasetId::UrbanRegime`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub original_query: String,
    pub intent: Intent,
    pub strategy: Strategy,
    pub entities: Entities,
    /// Ordered, deduplicated set of datasets the query needs.
    pub required_datasets: Vec<DatasetId>,
    pub is_construction_query: bool,
    pub is_counting_query: bool,
    pub is_risk_query: bool,
    /// Fixed clarification prompt when the query names a street but no
    /// neighborhood; short-circuits before agent execution.
    pub needs_clarification: Option<String>,
    pub signals: Signals,
    pub complexity: Complexity,
    /// Analyzer self-confidence in this classification.
    pub confidence: f64,
    /// Issues carried over from a failed validation pass (refinement only).
    pub validation_issues: Vec<String>,
    /// Confidence of the pass that triggered refinement.
    pub previous_confidence: Option<f64>,
}

impl Context {
    /// Minimal context for a query, before analyzer enrichment.
    pub fn new(original_query: impl Into<String>) -> Self {
        Self {
            original_query: original_query.into(),
            intent: Intent::Hybrid,
            strategy: Strategy::Hybrid,
            entities: Entities::default(),
            required_datasets: Vec::new(),
            is_construction_query: false,
            is_counting_query: false,
            is_risk_query: false,
            needs_clarification: None,
            signals: Signals::default(),
            complexity: Complexity::Low,
            confidence: 0.5,
            validation_issues: Vec::new(),
            previous_confidence: None,
        }
    }

    /// Push a dataset preserving order and uniqueness.
    pub fn require_dataset(&mut self, dataset: DatasetId) {
        if !self.required_datasets.contains(&dataset) {
            self.required_datasets.push(dataset);
        }
    }

    /// Force a dataset to the front of the ordered set.
    pub fn prepend_dataset(&mut self, dataset: DatasetId) {
        self.required_datasets.retain(|d| *d != dataset);
        self.required_datasets.insert(0, dataset);
    }

    /// Derive the augmented context used by the single refinement round.
    #[must_use]
    pub fn refined(&self, issues: Vec<String>, previous_confidence: f64) -> Self {
        let mut refined = self.clone();
        refined.validation_issues = issues;
        refined.previous_confidence = Some(previous_confidence);
        refined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_dataset_deduplicates() {
        let mut ctx = Context::new("teste");
        ctx.require_dataset(DatasetId::UrbanRegime);
        ctx.require_dataset(DatasetId::ZoneNeighborhoods);
        ctx.require_dataset(DatasetId::UrbanRegime);

        assert_eq!(
            ctx.required_datasets,
            vec![DatasetId::UrbanRegime, DatasetId::ZoneNeighborhoods]
        );
    }

    #[test]
    fn prepend_dataset_moves_to_front() {
        let mut ctx = Context::new("teste");
        ctx.require_dataset(DatasetId::ZoneNeighborhoods);
        ctx.require_dataset(DatasetId::UrbanRegime);
        ctx.prepend_dataset(DatasetId::UrbanRegime);

        assert_eq!(ctx.required_datasets[0], DatasetId::UrbanRegime);
        assert_eq!(ctx.required_datasets.len(), 2);
    }

    #[test]
    fn refined_context_keeps_original_classification() {
        let mut ctx = Context::new("o que posso construir no cristal");
        ctx.is_construction_query = true;
        ctx.strategy = Strategy::StructuredOnly;

        let refined = ctx.refined(vec!["empty results".to_string()], 0.55);
        assert!(refined.is_construction_query);
        assert_eq!(refined.previous_confidence, Some(0.55));
        assert_eq!(refined.validation_issues.len(), 1);
    }
}
