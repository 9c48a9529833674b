//! Rows and payload fragments served by the regulation store and the
//! legal-text search interface.

use serde::{Deserialize, Serialize};

/// One row of the structured regulation table: the numeric planning
/// parameters for a zone inside a neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeRow {
    pub neighborhood: String,
    pub zone: String,
    pub max_height_m: Option<f64>,
    pub base_utilization_coefficient: Option<f64>,
    pub max_utilization_coefficient: Option<f64>,
    pub occupancy_rate: Option<f64>,
}

impl RegimeRow {
    /// Count of populated numeric parameters, used by the completeness
    /// heuristic.
    pub fn populated_fields(&self) -> usize {
        [
            self.max_height_m,
            self.base_utilization_coefficient,
            self.max_utilization_coefficient,
            self.occupancy_rate,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

/// One row of the zone-to-neighborhood mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMembership {
    pub neighborhood: String,
    pub zone: String,
    pub zones_in_neighborhood: Option<i64>,
}

/// Disaster risk classification for a neighborhood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskRow {
    pub neighborhood: String,
    pub risk_level: Option<String>,
    pub risk_kind: Option<String>,
}

/// A ranked passage returned by the legal-text search interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalPassage {
    pub content: String,
    pub similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Data domains and query-serving capabilities currently available,
/// reported by the regulation store and checked by the validator agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Data domains with at least one row available.
    pub domains: Vec<String>,
    pub regime_queries: bool,
    pub vector_search: bool,
    pub risk_data: bool,
}
