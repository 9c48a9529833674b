//! Multi-criteria reranker over the collected agent results.
//!
//! Scores five fixed criteria per result and orders by the weighted sum.
//! The sort is stable, so equal scores keep the original agent invocation
//! order.

use tracing::debug;

use crate::domain::models::{
    AgentKind, AgentPayload, AgentPriority, AgentResult, Context, CriteriaScores, RankedResult,
    Route,
};

/// Rank the results collected for one execution round.
pub fn rerank(results: Vec<AgentResult>, route: &Route, ctx: &Context) -> Vec<RankedResult> {
    let mut ranked: Vec<RankedResult> = results
        .into_iter()
        .map(|result| {
            let scores = score(&result, route, ctx);
            RankedResult::new(result, scores)
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if let Some(top) = ranked.first() {
        debug!(
            top_agent = %top.result.kind,
            top_score = top.final_score,
            "reranked agent results"
        );
    }
    ranked
}

fn score(result: &AgentResult, route: &Route, ctx: &Context) -> CriteriaScores {
    let priority = route
        .entries
        .iter()
        .find(|(kind, _)| *kind == result.kind)
        .map_or(AgentPriority::Medium, |(_, p)| *p)
        .score();

    CriteriaScores {
        confidence: result.confidence,
        priority,
        relevance: relevance(result, ctx),
        completeness: completeness(result),
        authority: authority(result.kind),
    }
}

/// How well the agent's specialty matches the query signals, plus a bonus
/// for results that actually mention the extracted entities.
fn relevance(result: &AgentResult, ctx: &Context) -> f64 {
    let mut score: f64 = 0.5;

    match result.kind {
        AgentKind::Legal if ctx.signals.has_legal_signals => score += 0.3,
        AgentKind::Structured if ctx.signals.has_location_signals => score += 0.3,
        AgentKind::Conceptual if ctx.signals.wants_definition => score += 0.2,
        AgentKind::Calculator if ctx.signals.wants_calculation => score += 0.2,
        AgentKind::KnowledgeGraph if ctx.is_risk_query => score += 0.2,
        _ => {}
    }

    if let Some(text) = result.payload.response_text() {
        let upper = text.to_uppercase();
        let mentioned = ctx
            .entities
            .neighborhoods
            .iter()
            .chain(ctx.entities.zones.iter())
            .any(|entity| upper.contains(entity.as_str()));
        if mentioned {
            score += 0.2;
        }
    }

    score.min(1.0)
}

fn completeness(result: &AgentResult) -> f64 {
    let fields = result.payload.populated_fields();
    let mut score: f64 = 0.5;
    if fields > 3 {
        score += 0.3;
    }
    if fields > 5 {
        score += 0.2;
    }
    if !result.payload.has_empty_values() {
        score += 0.2;
    }
    score.min(1.0)
}

/// Source authority: legal text and the entity graph over heuristics.
fn authority(kind: AgentKind) -> f64 {
    match kind {
        AgentKind::Legal | AgentKind::KnowledgeGraph => 0.9,
        _ => 0.7,
    }
}
