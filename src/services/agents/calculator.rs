//! Calculator agent: building-potential arithmetic over retrieved
//! regulation parameters.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentKind, AgentPayload, AgentResult, Context};
use crate::domain::ports::RegulationStore;
use crate::services::agents::Agent;
use crate::services::text::{normalize_query, search_patterns};

pub struct CalculatorAgent {
    store: Arc<dyn RegulationStore>,
}

impl CalculatorAgent {
    pub fn new(store: Arc<dyn RegulationStore>) -> Self {
        Self { store }
    }

    async fn compute(&self, ctx: &Context) -> DomainResult<AgentResult> {
        let area = extract_area(&ctx.original_query);

        let Some(neighborhood) = ctx.entities.neighborhoods.iter().next() else {
            return Ok(low_confidence(
                "Para calcular o potencial construtivo, informe o bairro do terreno.",
            ));
        };

        let rows = self
            .store
            .regime_by_neighborhood(&search_patterns(neighborhood))
            .await?;
        let coefficient = rows
            .iter()
            .filter_map(|r| r.max_utilization_coefficient)
            .fold(None, |acc: Option<f64>, ca| {
                Some(acc.map_or(ca, |best| best.max(ca)))
            });

        let Some(ca) = coefficient else {
            return Ok(low_confidence(&format!(
                "Não há coeficiente de aproveitamento registrado para {neighborhood}."
            )));
        };

        let Some(area) = area else {
            return Ok(AgentResult::new(
                AgentKind::Calculator,
                0.6,
                AgentPayload::Calculator {
                    response: format!(
                        "O coeficiente de aproveitamento máximo em {neighborhood} é {ca}. \
Informe a área do terreno para calcular o potencial construtivo."
                    ),
                    value: Some(ca),
                    formula: None,
                },
            ));
        };

        let potential = area * ca;
        let response = format!(
            "Potencial construtivo estimado em {neighborhood}: {area} m² × CA máximo {ca} \
= {potential} m² de área edificável."
        );
        Ok(AgentResult::new(
            AgentKind::Calculator,
            0.8,
            AgentPayload::Calculator {
                response,
                value: Some(potential),
                formula: Some("área do terreno × coeficiente de aproveitamento máximo".to_string()),
            },
        ))
    }
}

fn low_confidence(note: &str) -> AgentResult {
    AgentResult::new(
        AgentKind::Calculator,
        0.4,
        AgentPayload::Calculator {
            response: note.to_string(),
            value: None,
            formula: None,
        },
    )
}

/// First plausible terrain area in the query, in square meters.
///
/// Accepts "500m2", "500 m²", "1.200,50 m2" and a bare number next to the
/// word "terreno".
fn extract_area(query: &str) -> Option<f64> {
    let folded = normalize_query(query).replace('²', "2");
    let tokens: Vec<&str> = folded.split_whitespace().collect();

    for (idx, token) in tokens.iter().enumerate() {
        let (number_part, had_unit) = match token.strip_suffix("m2") {
            Some(rest) => (rest, true),
            None => (*token, false),
        };
        let Some(value) = parse_pt_number(number_part) else {
            continue;
        };
        let next_is_unit = tokens.get(idx + 1).is_some_and(|t| *t == "m2" || *t == "m²");
        let near_terreno = tokens
            .iter()
            .any(|t| *t == "terreno" || t.starts_with("lote"));
        if had_unit || next_is_unit || near_terreno {
            return Some(value);
        }
    }
    None
}

/// Parse a Portuguese-formatted number: "1.200,50" as well as "500".
fn parse_pt_number(raw: &str) -> Option<f64> {
    let cleaned = if raw.contains(',') {
        raw.replace('.', "").replace(',', ".")
    } else {
        raw.to_string()
    };
    if cleaned.is_empty() || !cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

#[async_trait]
impl Agent for CalculatorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Calculator
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        match self.compute(ctx).await {
            Ok(result) => result,
            Err(err) => AgentResult::degraded(
                AgentKind::Calculator,
                &format!("cálculo indisponível: {err}"),
            ),
        }
    }
}
