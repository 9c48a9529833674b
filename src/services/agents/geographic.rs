//! Geographic agent: jurisdiction checks and city-level location facts.

use async_trait::async_trait;

use crate::domain::models::{AgentKind, AgentPayload, AgentResult, Context};
use crate::services::agents::Agent;
use crate::services::gazetteer;
use crate::services::text::normalize_query;

/// Municipalities of the metropolitan region the plan does not cover.
const OUTSIDE_JURISDICTION: &[&str] = &[
    "gramado",
    "canela",
    "canoas",
    "viamao",
    "alvorada",
    "cachoeirinha",
    "gravatai",
    "sao leopoldo",
    "novo hamburgo",
];

const POPULATION_FACT: &str = "Porto Alegre tem aproximadamente 1,33 milhão de habitantes \
(Censo IBGE 2022), distribuídos em 94 bairros.";

#[derive(Default)]
pub struct GeographicAgent;

impl GeographicAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Agent for GeographicAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Geographic
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        let folded = normalize_query(&ctx.original_query);

        if let Some(city) = OUTSIDE_JURISDICTION.iter().find(|c| folded.contains(*c)) {
            let response = format!(
                "A localidade \"{city}\" está fora da jurisdição deste plano diretor, \
que cobre apenas o município de Porto Alegre."
            );
            return AgentResult::new(
                AgentKind::Geographic,
                0.9,
                AgentPayload::Geographic {
                    response,
                    out_of_jurisdiction: true,
                },
            );
        }

        if folded.contains("populacao") || folded.contains("habitantes") {
            return AgentResult::new(
                AgentKind::Geographic,
                0.85,
                AgentPayload::Geographic {
                    response: POPULATION_FACT.to_string(),
                    out_of_jurisdiction: false,
                },
            );
        }

        if let Some(neighborhood) = ctx.entities.neighborhoods.iter().next() {
            let response = format!(
                "{neighborhood} é um bairro de Porto Alegre dentro da área de \
abrangência do plano diretor."
            );
            return AgentResult::new(
                AgentKind::Geographic,
                0.6,
                AgentPayload::Geographic {
                    response,
                    out_of_jurisdiction: false,
                },
            );
        }

        let response = if gazetteer::mentions_city(&ctx.original_query) {
            "A consulta se refere ao município de Porto Alegre como um todo.".to_string()
        } else {
            "Nenhuma referência geográfica reconhecida na consulta.".to_string()
        };
        AgentResult::new(
            AgentKind::Geographic,
            0.4,
            AgentPayload::Geographic {
                response,
                out_of_jurisdiction: false,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context_analyzer::analyze_local;

    #[tokio::test]
    async fn detects_out_of_jurisdiction_city() {
        let ctx = analyze_local("posso construir um prédio em Gramado?");
        let result = GeographicAgent::new().retrieve(&ctx).await;
        match result.payload {
            AgentPayload::Geographic {
                out_of_jurisdiction,
                ..
            } => assert!(out_of_jurisdiction),
            _ => panic!("wrong payload"),
        }
        assert!(result.confidence > 0.8);
    }

    #[tokio::test]
    async fn answers_population_question() {
        let ctx = analyze_local("qual a população de porto alegre?");
        let result = GeographicAgent::new().retrieve(&ctx).await;
        match result.payload {
            AgentPayload::Geographic { response, .. } => {
                assert!(response.contains("1,33 milhão"));
            }
            _ => panic!("wrong payload"),
        }
    }

    #[tokio::test]
    async fn confirms_known_neighborhood() {
        let ctx = analyze_local("altura máxima no cristal");
        let result = GeographicAgent::new().retrieve(&ctx).await;
        match result.payload {
            AgentPayload::Geographic {
                response,
                out_of_jurisdiction,
            } => {
                assert!(response.contains("CRISTAL"));
                assert!(!out_of_jurisdiction);
            }
            _ => panic!("wrong payload"),
        }
    }
}
