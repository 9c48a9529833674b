//! Legal agent: article citations for known legal concepts plus passages
//! from the legal-text corpus.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::models::{AgentKind, AgentPayload, AgentResult, Context, LegalPassage};
use crate::domain::ports::LegalSearch;
use crate::services::agents::Agent;
use crate::services::text::normalize_query;

const PASSAGE_LIMIT: usize = 3;

/// Concept table: trigger terms (normalized), citation, law, summary line.
const LEGAL_CONCEPTS: &[(&[&str], &str, &str, &str)] = &[
    (
        &["certificacao", "sustentabilidade ambiental"],
        "Art. 81, inciso III",
        "LUOS",
        "A certificação em sustentabilidade ambiental é tratada no Art. 81, inciso III, da LUOS.",
    ),
    (
        &["eiv", "estudo de impacto de vizinhanca"],
        "Art. 89",
        "LUOS",
        "O Estudo de Impacto de Vizinhança (EIV) é regulamentado pelo Art. 89 da LUOS.",
    ),
    (
        &["zeis", "zonas especiais de interesse social"],
        "Art. 92",
        "PDUS",
        "As Zonas Especiais de Interesse Social (ZEIS) são definidas no Art. 92 do PDUS.",
    ),
    (
        &["outorga onerosa"],
        "Art. 86",
        "LUOS",
        "A outorga onerosa do direito de construir é disciplinada pelo Art. 86 da LUOS.",
    ),
    (
        &["4o distrito", "quarto distrito"],
        "Art. 74",
        "PDUS",
        "O programa de revitalização do 4º Distrito está previsto no Art. 74 do PDUS.",
    ),
];

pub struct LegalAgent {
    search: Arc<dyn LegalSearch>,
}

impl LegalAgent {
    pub fn new(search: Arc<dyn LegalSearch>) -> Self {
        Self { search }
    }
}

fn match_concepts(folded: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut citations = Vec::new();
    let mut laws = Vec::new();
    let mut summaries = Vec::new();

    for (triggers, citation, law, summary) in LEGAL_CONCEPTS {
        if triggers.iter().any(|t| folded.contains(t)) {
            citations.push((*citation).to_string());
            if !laws.contains(&(*law).to_string()) {
                laws.push((*law).to_string());
            }
            summaries.push((*summary).to_string());
        }
    }
    (citations, laws, summaries)
}

#[async_trait]
impl Agent for LegalAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Legal
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        let folded = normalize_query(&ctx.original_query);
        let (citations, laws, summaries) = match_concepts(&folded);

        let passages: Vec<LegalPassage> = match self
            .search
            .search(&ctx.original_query, PASSAGE_LIMIT)
            .await
        {
            Ok(passages) => passages,
            Err(err) => {
                if citations.is_empty() {
                    return AgentResult::degraded(
                        AgentKind::Legal,
                        &format!("busca legal indisponível: {err}"),
                    );
                }
                // Citation table still answers; the passage search just
                // failed to enrich it.
                warn!(error = %err, "legal passage search failed, keeping citations");
                Vec::new()
            }
        };

        let response = if summaries.is_empty() {
            passages
                .first()
                .map(|p| p.content.clone())
                .unwrap_or_else(|| {
                    "Nenhuma referência legal encontrada para a consulta.".to_string()
                })
        } else {
            summaries.join(" ")
        };

        let confidence = if !citations.is_empty() {
            0.85
        } else if !passages.is_empty() {
            0.6
        } else {
            0.3
        };

        AgentResult::new(
            AgentKind::Legal,
            confidence,
            AgentPayload::Legal {
                response,
                citations,
                laws,
                passages,
            },
        )
    }
}
