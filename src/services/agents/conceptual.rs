//! Conceptual agent: definition and explanation passages via the
//! legal-text search interface.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{AgentKind, AgentPayload, AgentResult, Context};
use crate::domain::ports::LegalSearch;
use crate::services::agents::Agent;

const PASSAGE_LIMIT: usize = 3;

pub struct ConceptualAgent {
    search: Arc<dyn LegalSearch>,
}

impl ConceptualAgent {
    pub fn new(search: Arc<dyn LegalSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl Agent for ConceptualAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Conceptual
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        let passages = match self.search.search(&ctx.original_query, PASSAGE_LIMIT).await {
            Ok(passages) => passages,
            Err(err) => {
                return AgentResult::degraded(
                    AgentKind::Conceptual,
                    &format!("busca conceitual indisponível: {err}"),
                );
            }
        };

        if passages.is_empty() {
            return AgentResult::new(
                AgentKind::Conceptual,
                0.3,
                AgentPayload::Conceptual {
                    response: "Nenhum trecho relevante encontrado na base documental."
                        .to_string(),
                    passages,
                },
            );
        }

        // Passages arrive ranked; the top one leads the response and its
        // similarity bounds the confidence.
        let response = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let confidence = passages[0].similarity.clamp(0.4, 0.9);

        AgentResult::new(
            AgentKind::Conceptual,
            confidence,
            AgentPayload::Conceptual { response, passages },
        )
    }
}
