//! Specialized retrieval agents and the registry the pipeline dispatches
//! through.
//!
//! Agents are infallible by contract: any downstream failure is converted
//! into a degraded low-confidence result so one broken dependency never
//! takes the whole answer down with it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{AgentKind, AgentResult, Context};
use crate::domain::ports::{LegalSearch, RegulationStore};

pub mod calculator;
pub mod conceptual;
pub mod geographic;
pub mod knowledge_graph;
pub mod legal;
pub mod structured;
pub mod validator;

pub use calculator::CalculatorAgent;
pub use conceptual::ConceptualAgent;
pub use geographic::GeographicAgent;
pub use knowledge_graph::KnowledgeGraphAgent;
pub use legal::LegalAgent;
pub use structured::StructuredAgent;
pub use validator::ValidatorAgent;

/// One retrieval specialist.
#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Retrieve evidence for the query. Must not fail: dependency errors
    /// come back as [`AgentResult::degraded`].
    async fn retrieve(&self, ctx: &Context) -> AgentResult;
}

/// Lookup table from agent kind to implementation.
#[derive(Clone)]
pub struct AgentRegistry {
    agents: HashMap<AgentKind, Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Wire the full agent set against the given ports.
    pub fn new(store: Arc<dyn RegulationStore>, search: Arc<dyn LegalSearch>) -> Self {
        let mut agents: HashMap<AgentKind, Arc<dyn Agent>> = HashMap::new();
        let entries: Vec<Arc<dyn Agent>> = vec![
            Arc::new(StructuredAgent::new(Arc::clone(&store))),
            Arc::new(LegalAgent::new(Arc::clone(&search))),
            Arc::new(GeographicAgent::new()),
            Arc::new(CalculatorAgent::new(Arc::clone(&store))),
            Arc::new(KnowledgeGraphAgent::new(Arc::clone(&store))),
            Arc::new(ConceptualAgent::new(search)),
            Arc::new(ValidatorAgent::new(store)),
        ];
        for agent in entries {
            agents.insert(agent.kind(), agent);
        }
        Self { agents }
    }

    pub fn get(&self, kind: AgentKind) -> Option<Arc<dyn Agent>> {
        self.agents.get(&kind).cloned()
    }
}
