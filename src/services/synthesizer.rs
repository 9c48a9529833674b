//! Final answer synthesis from the ranked evidence.
//!
//! Primary path prompts the LLM with only the retrieved evidence; if the
//! call fails, a deterministic composer assembles an answer from citations
//! and graph relations instead. Both paths append the low-confidence
//! disclaimer below the floor, and neither invents data the agents did not
//! return.

use std::sync::Arc;

use tracing::warn;

use crate::domain::models::{AgentPayload, Context, RankedResult, CONFIDENCE_FLOOR};
use crate::domain::ports::{ChatMessage, CompletionRequest, LlmClient};

/// Answer returned when no path could produce anything useful.
pub const FALLBACK_RESPONSE: &str = "Não foi possível processar sua consulta no momento. \
Por favor, reformule a pergunta ou tente novamente mais tarde.";

/// Appended to any answer whose final confidence sits below the floor.
pub const LOW_CONFIDENCE_DISCLAIMER: &str = "\n\n⚠️ Nota: Esta resposta tem confiança \
moderada. Recomenda-se verificação adicional.";

const SYNTHESIS_SYSTEM_PROMPT: &str = "Você é o assistente oficial do plano diretor de \
Porto Alegre. Responda em português usando exclusivamente as evidências fornecidas. \
Cite artigos de lei quando presentes nas evidências. Se as evidências não cobrirem a \
pergunta, diga isso explicitamente. Nunca invente números ou artigos.";

pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32) -> Self {
        Self { llm, max_tokens }
    }

    /// Produce the final answer text for one query.
    ///
    /// Infallible: an LLM failure falls back to the deterministic composer.
    pub async fn synthesize(
        &self,
        ctx: &Context,
        ranked: &[RankedResult],
        final_confidence: f64,
        model: Option<&str>,
    ) -> String {
        let evidence = collect_evidence(ranked);

        let mut answer = if evidence.is_empty() {
            FALLBACK_RESPONSE.to_string()
        } else {
            match self.complete(ctx, &evidence, model).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => compose_fallback(&evidence),
                Err(err) => {
                    warn!(error = %err, "synthesis completion failed, composing locally");
                    compose_fallback(&evidence)
                }
            }
        };

        if final_confidence < CONFIDENCE_FLOOR {
            answer.push_str(LOW_CONFIDENCE_DISCLAIMER);
        }
        answer
    }

    async fn complete(
        &self,
        ctx: &Context,
        evidence: &[String],
        model: Option<&str>,
    ) -> crate::domain::errors::DomainResult<String> {
        let user = format!(
            "Pergunta: {}\n\nEvidências:\n{}",
            ctx.original_query,
            evidence.join("\n")
        );
        let completion = self
            .llm
            .complete(CompletionRequest {
                messages: vec![
                    ChatMessage::system(SYNTHESIS_SYSTEM_PROMPT),
                    ChatMessage::user(user),
                ],
                model: model.map(str::to_string),
                max_tokens: Some(self.max_tokens),
            })
            .await?;
        Ok(completion.text)
    }
}

/// Evidence lines from the ranked results, best first. Degraded results
/// and the validator verdict carry no evidence.
fn collect_evidence(ranked: &[RankedResult]) -> Vec<String> {
    let mut lines = Vec::new();

    for item in ranked {
        if item.result.is_degraded() {
            continue;
        }
        match &item.result.payload {
            AgentPayload::Validator { .. } => {}
            AgentPayload::Graph { edges, risks, .. } => {
                for edge in edges {
                    lines.push(format!("- {}", edge.sentence()));
                }
                for risk in risks {
                    if let (Some(level), Some(kind)) = (&risk.risk_level, &risk.risk_kind) {
                        lines.push(format!(
                            "- {} tem risco {} de {}.",
                            risk.neighborhood, level, kind
                        ));
                    }
                }
            }
            payload => {
                if let Some(text) = payload.response_text() {
                    if !text.trim().is_empty() && !payload.has_empty_values() {
                        lines.push(format!("- [{}] {}", item.result.kind, text));
                    }
                }
                if let AgentPayload::Legal { citations, laws, .. } = payload {
                    for citation in citations {
                        lines.push(format!("- Referência: {citation} ({}).", laws.join("/")));
                    }
                }
            }
        }
    }
    lines
}

/// Deterministic composition used when the LLM is unavailable: the best
/// textual evidence verbatim plus the legal references.
fn compose_fallback(evidence: &[String]) -> String {
    let mut sections: Vec<String> = Vec::new();
    let mut references: Vec<&str> = Vec::new();

    for line in evidence {
        let stripped = line.trim_start_matches("- ");
        if stripped.starts_with("Referência:") {
            references.push(stripped);
        } else {
            // Drop the agent tag prefix from the readable body.
            let body = stripped
                .split_once("] ")
                .map_or(stripped, |(_, rest)| rest);
            sections.push(body.to_string());
        }
    }

    let mut answer = sections.join("\n\n");
    if !references.is_empty() {
        answer.push_str("\n\n");
        answer.push_str(&references.join("\n"));
    }
    if answer.trim().is_empty() {
        answer = FALLBACK_RESPONSE.to_string();
    }
    answer
}
