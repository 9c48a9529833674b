//! Structured agent: relational lookups against the regulation tables.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AgentKind, AgentPayload, AgentResult, Context, DatasetId, RegimeRow, ZoneMembership,
};
use crate::domain::ports::RegulationStore;
use crate::services::agents::Agent;
use crate::services::text::search_patterns;

pub struct StructuredAgent {
    store: Arc<dyn RegulationStore>,
}

impl StructuredAgent {
    pub fn new(store: Arc<dyn RegulationStore>) -> Self {
        Self { store }
    }

    async fn counting(&self, ctx: &Context) -> DomainResult<AgentResult> {
        // Aggregate over heights when the analyzer flagged the regime table.
        if ctx.required_datasets.contains(&DatasetId::UrbanRegime) {
            if let Some(row) = self.store.tallest_regime().await? {
                let height = row.max_height_m.unwrap_or_default();
                let response = format!(
                    "A maior altura máxima registrada é de {height} metros, na {} (bairro {}).",
                    row.zone, row.neighborhood
                );
                return Ok(self.result(response, vec![row], Vec::new(), None, 0.9));
            }
            return Ok(self.empty("Nenhum registro de altura máxima encontrado."));
        }

        // Zone count for a named neighborhood.
        if let Some(neighborhood) = ctx.entities.neighborhoods.iter().next() {
            let memberships = self
                .store
                .zones_for_neighborhood(&search_patterns(neighborhood))
                .await?;
            if memberships.is_empty() {
                return Ok(self.empty(&format!(
                    "Não há zonas registradas para o bairro {neighborhood}."
                )));
            }
            let zones: Vec<&str> = memberships.iter().map(|m| m.zone.as_str()).collect();
            let response = format!(
                "O bairro {neighborhood} abrange {} zona(s): {}.",
                memberships.len(),
                zones.join(", ")
            );
            let count = i64::try_from(memberships.len()).unwrap_or(i64::MAX);
            return Ok(self.result(response, Vec::new(), memberships, Some(count), 0.9));
        }

        // City-wide neighborhood count.
        let count = self.store.neighborhood_count().await?;
        let response = format!("Porto Alegre possui {count} bairros na base de zoneamento.");
        Ok(self.result(response, Vec::new(), Vec::new(), Some(count), 0.9))
    }

    async fn lookup(&self, ctx: &Context) -> DomainResult<AgentResult> {
        let mut rows: Vec<RegimeRow> = Vec::new();
        let mut memberships: Vec<ZoneMembership> = Vec::new();

        for neighborhood in &ctx.entities.neighborhoods {
            let patterns = search_patterns(neighborhood);
            rows.extend(self.store.regime_by_neighborhood(&patterns).await?);
            memberships.extend(self.store.zones_for_neighborhood(&patterns).await?);
        }

        for zone in &ctx.entities.zones {
            rows.extend(self.store.regime_by_zone(zone).await?);
            // A zone with no neighborhood named is a membership listing.
            if ctx.entities.neighborhoods.is_empty() {
                memberships.extend(self.store.neighborhoods_in_zone(zone).await?);
            }
        }

        rows.dedup_by(|a, b| a.neighborhood == b.neighborhood && a.zone == b.zone);
        memberships.dedup_by(|a, b| a.neighborhood == b.neighborhood && a.zone == b.zone);

        if rows.is_empty() && memberships.is_empty() {
            debug!("structured lookup found no rows");
            return Ok(self.empty(
                "Nenhum dado de regime urbanístico encontrado para os locais informados.",
            ));
        }

        let response = compose_response(&rows, &memberships);
        Ok(self.result(response, rows, memberships, None, 0.9))
    }

    fn result(
        &self,
        response: String,
        rows: Vec<RegimeRow>,
        memberships: Vec<ZoneMembership>,
        count: Option<i64>,
        confidence: f64,
    ) -> AgentResult {
        AgentResult::new(
            AgentKind::Structured,
            confidence,
            AgentPayload::Structured {
                response,
                rows,
                memberships,
                count,
            },
        )
    }

    fn empty(&self, note: &str) -> AgentResult {
        self.result(note.to_string(), Vec::new(), Vec::new(), None, 0.3)
    }
}

fn compose_response(rows: &[RegimeRow], memberships: &[ZoneMembership]) -> String {
    let mut lines = Vec::new();

    for row in rows {
        let mut parts = Vec::new();
        if let Some(h) = row.max_height_m {
            parts.push(format!("altura máxima {h} m"));
        }
        if let Some(ca) = row.base_utilization_coefficient {
            parts.push(format!("CA básico {ca}"));
        }
        if let Some(ca) = row.max_utilization_coefficient {
            parts.push(format!("CA máximo {ca}"));
        }
        if let Some(to) = row.occupancy_rate {
            parts.push(format!("taxa de ocupação {to}%"));
        }
        let detail = if parts.is_empty() {
            "sem parâmetros registrados".to_string()
        } else {
            parts.join(", ")
        };
        lines.push(format!("{} ({}): {detail}", row.neighborhood, row.zone));
    }

    if rows.is_empty() {
        for membership in memberships {
            lines.push(format!(
                "{} pertence à {}",
                membership.neighborhood, membership.zone
            ));
        }
    }

    lines.join("\n")
}

#[async_trait]
impl Agent for StructuredAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Structured
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        let outcome = if ctx.is_counting_query {
            self.counting(ctx).await
        } else {
            self.lookup(ctx).await
        };
        match outcome {
            Ok(result) => result,
            Err(err) => AgentResult::degraded(
                AgentKind::Structured,
                &format!("consulta estruturada indisponível: {err}"),
            ),
        }
    }
}
