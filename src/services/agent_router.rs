//! Deterministic context-to-route mapping.
//!
//! Pure function of the analyzed context; no I/O. The validator agent is
//! always routed at critical priority so every answer gets a scope check.

use crate::domain::models::{AgentKind, AgentPriority, Complexity, Context, Route, Strategy};

/// Build the agent route for an analyzed context.
///
/// The first rule to claim an agent sets its priority; later rules only
/// upgrade, never downgrade.
pub fn route_query(ctx: &Context) -> Route {
    let mut route = Route::default();

    route.push(AgentKind::Validator, AgentPriority::Critical);

    if ctx.signals.has_legal_signals {
        route.push(AgentKind::Legal, AgentPriority::High);
    }

    if ctx.signals.has_location_signals || ctx.signals.has_parameter_signals {
        route.push(AgentKind::Structured, AgentPriority::High);
        route.push(AgentKind::Geographic, AgentPriority::Medium);
    }

    if ctx.signals.wants_definition {
        route.push(AgentKind::Conceptual, AgentPriority::Medium);
    }

    if ctx.signals.wants_calculation {
        route.push(AgentKind::Calculator, AgentPriority::High);
    }

    if ctx.is_risk_query {
        route.push(AgentKind::KnowledgeGraph, AgentPriority::High);
    }

    // Strategy acts as a floor: a structured-only classification must reach
    // the relational store even when no individual signal fired.
    match ctx.strategy {
        Strategy::StructuredOnly => {
            route.push(AgentKind::Structured, AgentPriority::High);
        }
        Strategy::UnstructuredOnly => {
            route.push(AgentKind::Conceptual, AgentPriority::High);
        }
        Strategy::Hybrid => {
            route.push(AgentKind::Structured, AgentPriority::Medium);
            route.push(AgentKind::Conceptual, AgentPriority::Medium);
        }
        Strategy::Predefined => {}
    }

    if ctx.complexity == Complexity::High || route.len() > 3 {
        route.push(AgentKind::KnowledgeGraph, AgentPriority::High);
    }

    route
}
