//! The query pipeline: cache, analysis, routing, parallel retrieval,
//! reranking, validation, one refinement round and synthesis.
//!
//! `handle` is the single entry point and never returns an error: every
//! failure mode degrades into a well-formed response, worst case the fixed
//! fallback text with `status == Error`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::domain::models::{
    AgentKind, AgentPayload, AgentPriority, AgentResult, Config, Context, Intent,
    PipelineConfig, PipelineResponse, PipelineStep, Query, RankedResult, ResponseStatus, Route,
    Sources, StepStatus, TraceEvent, ValidationResult,
};
use crate::domain::ports::{
    CacheRepository, LegalSearch, LlmClient, RegulationStore, SessionRepository,
};
use crate::services::agent_router::route_query;
use crate::services::context_analyzer::PLAN_OBJECTIVES_RESPONSE;
use crate::services::reranker::rerank;
use crate::services::result_validator::validate;
use crate::services::synthesizer::FALLBACK_RESPONSE;
use crate::services::{AgentRegistry, AnswerCache, ContextAnalyzer, SessionMemory, Synthesizer};

/// Refinement is bounded to a single extra round per request.
enum RefinementRound {
    Initial,
    Refined,
}

pub struct QueryPipeline {
    analyzer: ContextAnalyzer,
    registry: AgentRegistry,
    synthesizer: Synthesizer,
    cache: AnswerCache,
    sessions: SessionMemory,
    config: PipelineConfig,
}

impl QueryPipeline {
    pub fn new(
        store: Arc<dyn RegulationStore>,
        search: Arc<dyn LegalSearch>,
        llm: Arc<dyn LlmClient>,
        cache_repository: Arc<dyn CacheRepository>,
        session_repository: Arc<dyn SessionRepository>,
        config: &Config,
    ) -> Self {
        Self {
            analyzer: ContextAnalyzer::new(Arc::clone(&llm)),
            registry: AgentRegistry::new(store, search),
            synthesizer: Synthesizer::new(llm, config.llm.max_tokens),
            cache: AnswerCache::new(cache_repository),
            sessions: SessionMemory::new(
                session_repository,
                config.pipeline.session_history_limit,
            ),
            config: config.pipeline.clone(),
        }
    }

    /// Run the full pipeline for one query.
    #[instrument(skip(self, query), fields(session = query.session_id.as_deref().unwrap_or("-")))]
    pub async fn handle(&self, query: Query) -> PipelineResponse {
        let started = Instant::now();
        let mut trace = Vec::new();

        if self.config.cache_enabled && !query.bypass_cache {
            trace.push(TraceEvent::new(PipelineStep::CacheLookup, StepStatus::Started));
            if let Some(entry) = self.cache.lookup(&query.text).await {
                trace.push(
                    TraceEvent::new(PipelineStep::CacheHit, StepStatus::Completed)
                        .with_detail(json!({ "key": entry.key, "hits": entry.hit_count })),
                );
                info!(key = %entry.key, "answered from cache");
                return PipelineResponse {
                    response: entry.response,
                    confidence: entry.confidence,
                    sources: Sources {
                        cached: true,
                        ..Sources::default()
                    },
                    execution_time_ms: elapsed_ms(started),
                    agent_trace: trace,
                    status: ResponseStatus::Ok,
                };
            }
            trace.push(TraceEvent::new(PipelineStep::CacheLookup, StepStatus::Completed));
        } else {
            trace.push(TraceEvent::new(PipelineStep::CacheLookup, StepStatus::Skipped));
        }

        let history = match &query.session_id {
            Some(session_id) => self.sessions.history(session_id).await,
            None => Vec::new(),
        };

        trace.push(TraceEvent::new(PipelineStep::ContextAnalysis, StepStatus::Started));
        let ctx = match self.analyzer.analyze(&query, &history).await {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(error = %err, "context analysis failed");
                trace.push(TraceEvent::new(PipelineStep::ContextAnalysis, StepStatus::Failed));
                return self.failure(started, trace, &err.to_string());
            }
        };
        trace.push(
            TraceEvent::new(PipelineStep::ContextAnalysis, StepStatus::Completed).with_detail(
                json!({
                    "intent": ctx.intent,
                    "strategy": ctx.strategy,
                    "construction": ctx.is_construction_query,
                    "counting": ctx.is_counting_query,
                }),
            ),
        );

        if ctx.intent == Intent::Predefined {
            trace.push(TraceEvent::new(PipelineStep::Synthesis, StepStatus::Skipped));
            return PipelineResponse {
                response: PLAN_OBJECTIVES_RESPONSE.to_string(),
                confidence: 1.0,
                sources: Sources::default(),
                execution_time_ms: elapsed_ms(started),
                agent_trace: trace,
                status: ResponseStatus::Ok,
            };
        }

        if let Some(prompt) = &ctx.needs_clarification {
            trace.push(TraceEvent::new(PipelineStep::Clarification, StepStatus::Completed));
            return PipelineResponse {
                response: prompt.clone(),
                confidence: 0.9,
                sources: Sources::default(),
                execution_time_ms: elapsed_ms(started),
                agent_trace: trace,
                status: ResponseStatus::Ok,
            };
        }

        trace.push(TraceEvent::new(PipelineStep::Routing, StepStatus::Started));
        let route = route_query(&ctx);
        if route.is_empty() {
            trace.push(TraceEvent::new(PipelineStep::Routing, StepStatus::Failed));
            return self.failure(started, trace, "empty route");
        }
        trace.push(
            TraceEvent::new(PipelineStep::Routing, StepStatus::Completed)
                .with_detail(json!({ "agents": route.agent_names() })),
        );

        let (ranked, verdict) = self.execute_and_refine(&ctx, &route, &mut trace).await;
        let final_confidence = verdict.confidence;

        trace.push(TraceEvent::new(PipelineStep::Synthesis, StepStatus::Started));
        let response = self
            .synthesizer
            .synthesize(&ctx, &ranked, final_confidence, query.model.as_deref())
            .await;
        trace.push(TraceEvent::new(PipelineStep::Synthesis, StepStatus::Completed));

        if self.config.cache_enabled {
            self.cache
                .admit(&query.text, &ctx, &response, final_confidence)
                .await;
            trace.push(TraceEvent::new(PipelineStep::CacheAdmission, StepStatus::Completed));
        }

        if let Some(session_id) = &query.session_id {
            let agent_results = match serde_json::to_value(&ranked) {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "agent result serialization failed");
                    Value::Null
                }
            };
            self.sessions
                .append(session_id, &ctx, agent_results, &response, final_confidence)
                .await;
            trace.push(TraceEvent::new(PipelineStep::SessionAppend, StepStatus::Completed));
        }

        PipelineResponse {
            response,
            confidence: final_confidence,
            sources: count_sources(&ranked),
            execution_time_ms: elapsed_ms(started),
            agent_trace: trace,
            status: ResponseStatus::Ok,
        }
    }

    /// First execution round plus at most one refinement round.
    async fn execute_and_refine(
        &self,
        ctx: &Context,
        route: &Route,
        trace: &mut Vec<TraceEvent>,
    ) -> (Vec<RankedResult>, ValidationResult) {
        let mut round = RefinementRound::Initial;
        let mut round_ctx = ctx.clone();
        let mut round_route = route.clone();

        loop {
            trace.push(TraceEvent::new(PipelineStep::AgentExecution, StepStatus::Started));
            let results = self.execute_round(&round_route, &round_ctx).await;
            let degraded = results.iter().filter(|r| r.is_degraded()).count();
            trace.push(
                TraceEvent::new(PipelineStep::AgentExecution, StepStatus::Completed)
                    .with_detail(json!({ "results": results.len(), "degraded": degraded })),
            );

            trace.push(TraceEvent::new(PipelineStep::Reranking, StepStatus::Started));
            let ranked = rerank(results, &round_route, &round_ctx);
            trace.push(TraceEvent::new(PipelineStep::Reranking, StepStatus::Completed));

            let verdict = validate(&ranked);
            trace.push(
                TraceEvent::new(PipelineStep::Validation, StepStatus::Completed).with_detail(
                    json!({ "confidence": verdict.confidence, "issues": verdict.issues }),
                ),
            );

            if verdict.requires_refinement && matches!(round, RefinementRound::Initial) {
                round = RefinementRound::Refined;
                trace.push(TraceEvent::new(PipelineStep::Refinement, StepStatus::Started));
                round_ctx = ctx.refined(verdict.issues.clone(), verdict.confidence);
                round_route.force(AgentKind::KnowledgeGraph, AgentPriority::Critical);
                round_route.force(AgentKind::Legal, AgentPriority::Critical);
                continue;
            }

            if matches!(round, RefinementRound::Refined) {
                trace.push(TraceEvent::new(PipelineStep::Refinement, StepStatus::Completed));
            }
            return (ranked, verdict);
        }
    }

    /// Fan the routed agents out on independent tasks. Each task carries
    /// its own timeout, so one slow agent is cancelled in isolation and
    /// comes back as a degraded result.
    async fn execute_round(&self, route: &Route, ctx: &Context) -> Vec<AgentResult> {
        let timeout = Duration::from_secs(self.config.agent_timeout_secs);
        let mut handles = Vec::new();

        for (kind, _) in &route.entries {
            let Some(agent) = self.registry.get(*kind) else {
                warn!(agent = %kind, "no implementation registered");
                continue;
            };
            let task_ctx = ctx.clone();
            let handle = tokio::spawn(async move {
                tokio::time::timeout(timeout, agent.retrieve(&task_ctx)).await
            });
            handles.push((*kind, handle));
        }

        let (kinds, tasks): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let outcomes = futures::future::join_all(tasks).await;

        kinds
            .into_iter()
            .zip(outcomes)
            .map(|(kind, outcome)| match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => {
                    warn!(agent = %kind, "agent timed out");
                    AgentResult::degraded(kind, "tempo limite de execução excedido")
                }
                Err(err) => {
                    warn!(agent = %kind, error = %err, "agent task failed");
                    AgentResult::degraded(kind, "falha interna do agente")
                }
            })
            .collect()
    }

    fn failure(
        &self,
        started: Instant,
        mut trace: Vec<TraceEvent>,
        detail: &str,
    ) -> PipelineResponse {
        trace.push(
            TraceEvent::new(PipelineStep::PipelineError, StepStatus::Failed)
                .with_detail(json!({ "error": detail })),
        );
        PipelineResponse {
            response: FALLBACK_RESPONSE.to_string(),
            confidence: 0.0,
            sources: Sources::default(),
            execution_time_ms: elapsed_ms(started),
            agent_trace: trace,
            status: ResponseStatus::Error,
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn count_sources(ranked: &[RankedResult]) -> Sources {
    let mut sources = Sources::default();
    for item in ranked {
        if item.result.is_degraded() || item.result.payload.has_empty_values() {
            continue;
        }
        match item.result.payload {
            AgentPayload::Structured { .. }
            | AgentPayload::Calculator { .. }
            | AgentPayload::Graph { .. } => sources.tabular += 1,
            AgentPayload::Legal { .. } | AgentPayload::Conceptual { .. } => {
                sources.conceptual += 1;
            }
            AgentPayload::Geographic { .. } | AgentPayload::Validator { .. } => {}
        }
    }
    sources
}
