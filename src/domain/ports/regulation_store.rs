//! Port for parameterized read access to the structured regulation tables.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Capabilities, RegimeRow, RiskRow, ZoneMembership};

/// Read access to the regulation table (keyed by neighborhood + zone), the
/// zone-to-neighborhood mapping and the risk table.
///
/// Callers pass every spelling variant they want tried (accented and
/// unaccented); implementations match case-insensitively and must tolerate
/// absent rows by returning empty vectors, never errors.
#[async_trait]
pub trait RegulationStore: Send + Sync {
    /// Regime rows for any of the given neighborhood spellings.
    async fn regime_by_neighborhood(&self, patterns: &[String]) -> DomainResult<Vec<RegimeRow>>;

    /// Regime rows for a canonical zone code.
    async fn regime_by_zone(&self, zone: &str) -> DomainResult<Vec<RegimeRow>>;

    /// Zone memberships for any of the given neighborhood spellings.
    async fn zones_for_neighborhood(
        &self,
        patterns: &[String],
    ) -> DomainResult<Vec<ZoneMembership>>;

    /// Neighborhoods belonging to a canonical zone code.
    async fn neighborhoods_in_zone(&self, zone: &str) -> DomainResult<Vec<ZoneMembership>>;

    /// Distinct neighborhood count in the mapping table.
    async fn neighborhood_count(&self) -> DomainResult<i64>;

    /// Regime row holding the largest registered maximum height.
    async fn tallest_regime(&self) -> DomainResult<Option<RegimeRow>>;

    /// Risk rows for any of the given neighborhood spellings.
    async fn risks_for_neighborhood(&self, patterns: &[String]) -> DomainResult<Vec<RiskRow>>;

    /// Data domains and query capabilities currently served.
    async fn capabilities(&self) -> DomainResult<Capabilities>;
}
