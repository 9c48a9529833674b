//! Knowledge-graph agent: builds a small neighborhood/zone/risk entity
//! graph from the structured tables.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AgentKind, AgentPayload, AgentResult, Context, GraphEdge, GraphNode, RiskRow,
};
use crate::domain::ports::RegulationStore;
use crate::services::agents::Agent;
use crate::services::text::search_patterns;

pub struct KnowledgeGraphAgent {
    store: Arc<dyn RegulationStore>,
}

impl KnowledgeGraphAgent {
    pub fn new(store: Arc<dyn RegulationStore>) -> Self {
        Self { store }
    }

    async fn build(&self, ctx: &Context) -> DomainResult<AgentResult> {
        let mut nodes: Vec<GraphNode> = Vec::new();
        let mut edges: Vec<GraphEdge> = Vec::new();
        let mut risks: Vec<RiskRow> = Vec::new();

        for neighborhood in &ctx.entities.neighborhoods {
            let patterns = search_patterns(neighborhood);

            push_node(&mut nodes, neighborhood, "bairro");
            for membership in self.store.zones_for_neighborhood(&patterns).await? {
                push_node(&mut nodes, &membership.zone, "zot");
                push_edge(&mut edges, neighborhood, &membership.zone, "PERTENCE_A");
            }

            for risk in self.store.risks_for_neighborhood(&patterns).await? {
                if let Some(kind) = &risk.risk_kind {
                    push_node(&mut nodes, kind, "risco");
                    push_edge(&mut edges, neighborhood, kind, "TEM_RISCO");
                }
                risks.push(risk);
            }
        }

        // A zone with no neighborhood named expands outward instead.
        if ctx.entities.neighborhoods.is_empty() {
            for zone in &ctx.entities.zones {
                push_node(&mut nodes, zone, "zot");
                for membership in self.store.neighborhoods_in_zone(zone).await? {
                    push_node(&mut nodes, &membership.neighborhood, "bairro");
                    push_edge(&mut edges, &membership.neighborhood, zone, "PERTENCE_A");
                }
            }
        }

        let confidence = if edges.is_empty() { 0.3 } else { 0.85 };
        Ok(AgentResult::new(
            AgentKind::KnowledgeGraph,
            confidence,
            AgentPayload::Graph {
                nodes,
                edges,
                risks,
            },
        ))
    }
}

fn push_node(nodes: &mut Vec<GraphNode>, id: &str, kind: &str) {
    if !nodes.iter().any(|n| n.id == id) {
        nodes.push(GraphNode {
            id: id.to_string(),
            kind: kind.to_string(),
            label: id.to_string(),
        });
    }
}

fn push_edge(edges: &mut Vec<GraphEdge>, source: &str, target: &str, relation: &str) {
    let edge = GraphEdge {
        source: source.to_string(),
        target: target.to_string(),
        relation: relation.to_string(),
    };
    if !edges.contains(&edge) {
        edges.push(edge);
    }
}

#[async_trait]
impl Agent for KnowledgeGraphAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::KnowledgeGraph
    }

    async fn retrieve(&self, ctx: &Context) -> AgentResult {
        match self.build(ctx).await {
            Ok(result) => result,
            Err(err) => AgentResult::degraded(
                AgentKind::KnowledgeGraph,
                &format!("grafo indisponível: {err}"),
            ),
        }
    }
}
