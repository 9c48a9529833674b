//! Validator agent: scope and capability coverage check for the query.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{AgentKind, AgentPayload, AgentResult, Context};
use crate::domain::ports::RegulationStore;
use crate::services::agents::Agent;
use crate::services::text::normalize_query;

/// Topics the planning corpus does not answer, with the subject reported
/// back in the issue.
const OUT_OF_SCOPE: &[(&str, &str)] = &[
    ("iptu", "tributação (IPTU)"),
    ("transporte publico", "transporte público"),
    ("onibus", "transporte público"),
    ("saude", "saúde pública"),
    ("escola", "educação"),
    ("seguranca publica", "segurança pública"),
];

pub struct ValidatorAgent {
    store: Arc<dyn RegulationStore>,
}

impl ValidatorAgent {
    pub fn new(store: Arc<dyn RegulationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Agent for ValidatorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Validator
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        let capabilities = match self.store.capabilities().await {
            Ok(capabilities) => capabilities,
            Err(err) => {
                return AgentResult::degraded(
                    AgentKind::Validator,
                    &format!("capacidades indisponíveis: {err}"),
                );
            }
        };

        let folded = normalize_query(&ctx.original_query);
        let mut issues = Vec::new();

        for (term, subject) in OUT_OF_SCOPE {
            if folded.contains(term) {
                issues.push(format!(
                    "Consulta sobre {subject} está fora do escopo do plano diretor."
                ));
            }
        }

        if ctx.is_construction_query && !capabilities.regime_queries {
            issues.push("Dados de regime urbanístico não estão disponíveis.".to_string());
        }
        if ctx.is_risk_query && !capabilities.risk_data {
            issues.push("Dados de risco de desastre não estão disponíveis.".to_string());
        }

        let valid = issues.is_empty();
        AgentResult::new(
            AgentKind::Validator,
            0.9,
            AgentPayload::Validator {
                valid,
                issues,
                available_domains: capabilities.domains,
            },
        )
    }
}
