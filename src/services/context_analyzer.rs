//! Context analyzer: intent classification, entity extraction and strategy
//! decision for one query.
//!
//! Classification runs as a prioritized list of pure keyword predicates in a
//! fixed precedence order; the order matters because later rules assume the
//! earlier ones already excluded their cases (counting before construction,
//! notably). An LLM classification call enriches the locally computed
//! context but can never override the precedence rules, and its failure
//! falls back to the local signals.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Complexity, Context, DatasetId, Intent, Query, SessionTurn, Signals, Strategy,
};
use crate::domain::ports::LlmClient;
use crate::services::gazetteer;
use crate::services::text::{
    extract_zones, looks_like_place_name, normalize_query, normalize_zone, token_count,
};

/// Fixed prompt returned when the query names a street but no neighborhood.
pub const CLARIFICATION_PROMPT: &str = "Para informações precisas sobre construção, \
por favor informe o bairro onde está localizado o endereço.";

/// Canned answer for the plan-objectives predefined intent.
pub const PLAN_OBJECTIVES_RESPONSE: &str = "O Plano Diretor de Desenvolvimento Urbano \
Sustentável estabelece cinco objetivos principais: 1) ordenamento territorial \
equilibrado; 2) desenvolvimento econômico sustentável; 3) ampliação da política \
habitacional e do acesso à moradia; 4) mobilidade urbana integrada; 5) preservação \
ambiental e resiliência climática.";

const OBJECTIVES_KEYWORDS: &[&str] = &[
    "objetivos do plano",
    "principais objetivos",
    "quais os objetivos",
    "quais sao os objetivos",
    "cinco principais",
    "objetivo",
];

const COUNTING_KEYWORDS: &[&str] = &[
    "quantos",
    "quantas",
    "quantidade",
    "total de",
    "numero de",
    "lista de",
    "listar",
    "liste",
    "media",
];

const UTILIZATION_TERMS: &[&str] = &[
    "coeficiente de aproveitamento",
    "indice de aproveitamento",
    "potencial construtivo",
    "indice construtivo",
    "aproveitamento",
    "coeficiente",
];

const OCCUPANCY_TERMS: &[&str] = &["taxa de ocupacao", "indice de ocupacao", "ocupacao"];

const HEIGHT_TERMS: &[&str] = &["altura maxima", "gabarito", "limite de altura", "altura"];

const BUILD_TERMS: &[&str] = &[
    "o que pode ser construido",
    "o que posso construir",
    "posso construir",
    "construir",
    "construido",
    "edificar",
    "edificacao",
    "obra",
    "regime urbanistico",
    "parametros construtivos",
    "parametros urbanisticos",
];

const LEGAL_TERMS: &[&str] = &[
    "artigo",
    "art.",
    "luos",
    "pdus",
    "inciso",
    "paragrafo",
    "lei ",
    "certificacao",
    "eiv",
    "zeis",
    "outorga onerosa",
    "estudo de impacto",
    "plano diretor",
];

const DEFINITION_TERMS: &[&str] = &[
    "o que e",
    "o que sao",
    "como funciona",
    "explique",
    "defina",
    "conceito",
    "resuma",
    "resumo",
];

const CALCULATION_TERMS: &[&str] = &["calcular", "calculo", "quanto", "valor"];

const RISK_TERMS: &[&str] = &[
    "risco",
    "inundacao",
    "alagamento",
    "enchente",
    "cota",
    "deslizamento",
    "desastre",
    "granizo",
    "vendaval",
];

const STREET_TERMS: &[&str] = &["rua ", "avenida ", "av. ", "travessa ", "alameda ", "estrada "];

const COMPARISON_TERMS: &[&str] = &["versus", "melhor que", "diferenca", "comparar", "compare"];

fn contains_any(folded: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| folded.contains(t))
}

fn assess_complexity(text: &str, folded: &str) -> Complexity {
    let tokens = token_count(text);
    if tokens > 30 || contains_any(folded, COMPARISON_TERMS) {
        Complexity::High
    } else if tokens > 15
        || folded.contains(" e ")
        || folded.contains(" ou ")
        || folded.contains(',')
    {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Analyzer producing one immutable [`Context`] per query.
pub struct ContextAnalyzer {
    llm: Arc<dyn LlmClient>,
}

impl ContextAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Analyze a query against the session history.
    ///
    /// Never fails for upstream reasons: a failed or malformed LLM
    /// classification keeps the locally computed context with a reduced
    /// confidence.
    #[instrument(skip(self, query, history), fields(query = %query.text))]
    pub async fn analyze(
        &self,
        query: &Query,
        history: &[SessionTurn],
    ) -> DomainResult<Context> {
        let mut ctx = analyze_local(&query.text);

        // Predefined and clarification outcomes are final; the LLM call
        // would add nothing and the pipeline short-circuits anyway.
        if ctx.intent == Intent::Predefined || ctx.needs_clarification.is_some() {
            return Ok(ctx);
        }

        match self.enrich(&ctx, history).await {
            Ok(enriched) => {
                apply_enrichment(&mut ctx, &enriched);
                debug!(intent = ?ctx.intent, strategy = ?ctx.strategy, "context enriched");
            }
            Err(err) => {
                // Recovered locally: keyword signals stand, including the
                // already-computed is_construction_query.
                warn!(error = %err, "LLM classification failed, keeping local signals");
                ctx.confidence = ctx.confidence.min(0.6);
            }
        }

        Ok(ctx)
    }

    async fn enrich(&self, ctx: &Context, history: &[SessionTurn]) -> DomainResult<Value> {
        let system = "Você é um analisador de consultas sobre o plano diretor urbano. \
Responda apenas com JSON contendo os campos: intent (conceptual|tabular|hybrid), \
bairros (lista), zots (lista), parametros (lista), confidence (0..1).";

        let recent: Vec<&str> = history
            .iter()
            .take(3)
            .map(|turn| turn.query.as_str())
            .collect();

        let user = format!(
            "Consulta: \"{}\"\nSinais locais: construcao={}, contagem={}, risco={}\n\
Consultas anteriores: {:?}",
            ctx.original_query, ctx.is_construction_query, ctx.is_counting_query,
            ctx.is_risk_query, recent,
        );

        self.llm.classify(system, &user).await
    }
}

/// Merge the LLM classification into the local context without letting it
/// override the precedence rules.
fn apply_enrichment(ctx: &mut Context, enriched: &Value) {
    if let Some(bairros) = enriched.get("bairros").and_then(Value::as_array) {
        for bairro in bairros.iter().filter_map(Value::as_str) {
            // Accept only gazetteer names; the city itself is filtered out.
            if gazetteer::is_neighborhood(bairro) {
                ctx.entities
                    .neighborhoods
                    .insert(bairro.trim().to_uppercase());
            }
        }
    }

    if let Some(zots) = enriched.get("zots").and_then(Value::as_array) {
        for zot in zots.iter().filter_map(Value::as_str) {
            if let Some(zone) = normalize_zone(zot) {
                ctx.entities.zones.insert(zone);
            }
        }
    }

    if let Some(parametros) = enriched.get("parametros").and_then(Value::as_array) {
        for parametro in parametros.iter().filter_map(Value::as_str) {
            ctx.entities
                .parameters
                .insert(normalize_query(parametro));
        }
    }

    // Intent may only be refined where the local rules left it open.
    if !ctx.is_construction_query && !ctx.is_counting_query {
        match enriched.get("intent").and_then(Value::as_str) {
            Some("conceptual") => ctx.intent = Intent::Conceptual,
            Some("tabular") => ctx.intent = Intent::Tabular,
            Some("hybrid") => ctx.intent = Intent::Hybrid,
            _ => {}
        }
    }

    if let Some(confidence) = enriched.get("confidence").and_then(Value::as_f64) {
        ctx.confidence = confidence.clamp(0.5, 0.95);
    }
}

/// Pure, deterministic part of the analysis. The precedence order here is
/// load-bearing; do not reorder the rules.
pub fn analyze_local(text: &str) -> Context {
    let folded = normalize_query(text);
    let mut ctx = Context::new(text);

    ctx.complexity = assess_complexity(text, &folded);

    // Entity extraction runs for every rule below.
    for zone in extract_zones(text) {
        ctx.entities.zones.insert(zone);
    }
    for neighborhood in gazetteer::find_neighborhoods(text) {
        ctx.entities.neighborhoods.insert(neighborhood);
    }
    collect_parameters(&folded, &mut ctx);

    let has_location_token = !ctx.entities.neighborhoods.is_empty()
        || !ctx.entities.zones.is_empty()
        || folded.contains("bairro")
        || folded.contains("zona")
        || folded.contains("zot")
        || folded.contains("distrito");

    ctx.signals = Signals {
        has_legal_signals: contains_any(&folded, LEGAL_TERMS),
        has_location_signals: has_location_token,
        has_parameter_signals: !ctx.entities.parameters.is_empty(),
        wants_definition: contains_any(&folded, DEFINITION_TERMS),
        wants_calculation: contains_any(&folded, CALCULATION_TERMS),
    };

    // Rule 1: plan objectives bypass everything else.
    if contains_any(&folded, OBJECTIVES_KEYWORDS) && folded.contains("plano") {
        ctx.intent = Intent::Predefined;
        ctx.strategy = Strategy::Predefined;
        ctx.confidence = 1.0;
        return ctx;
    }

    // Risk phrasing adds the risk dataset but never reclassifies on its own.
    if contains_any(&folded, RISK_TERMS) {
        ctx.is_risk_query = true;
        ctx.require_dataset(DatasetId::DisasterRisk);
    }

    // Rule 2: counting/aggregation is never a construction query, even when
    // it names a zone or neighborhood.
    let mentions_location_word =
        folded.contains("bairro") || folded.contains("zona") || folded.contains("zot");
    let is_counting = contains_any(&folded, COUNTING_KEYWORDS) && mentions_location_word;
    let is_aggregate_height = (folded.contains("altura") && folded.contains("mais alta"))
        || folded.contains("maior altura");

    if is_counting || is_aggregate_height {
        ctx.is_counting_query = true;
        ctx.intent = Intent::Tabular;
        ctx.strategy = Strategy::StructuredOnly;
        ctx.require_dataset(if is_aggregate_height {
            DatasetId::UrbanRegime
        } else {
            DatasetId::ZoneNeighborhoods
        });
        ctx.confidence = 0.85;
        finish_common(&mut ctx, &folded);
        return ctx;
    }

    // Rule 3: construction/regulatory-parameter intent, or a short query
    // that looks like a place name.
    let has_construction_terms = contains_any(&folded, UTILIZATION_TERMS)
        || contains_any(&folded, OCCUPANCY_TERMS)
        || contains_any(&folded, HEIGHT_TERMS)
        || contains_any(&folded, BUILD_TERMS);
    let short_place_query = token_count(text) <= 3 && looks_like_place_name(text);

    if has_construction_terms || short_place_query {
        ctx.is_construction_query = true;

        // The city name alone is not a neighborhood; a construction phrase
        // with no concrete location stays conceptual.
        if ctx.entities.neighborhoods.is_empty()
            && ctx.entities.zones.is_empty()
            && gazetteer::mentions_city(text)
        {
            ctx.is_construction_query = false;
            ctx.intent = Intent::Conceptual;
            ctx.strategy = Strategy::Hybrid;
            ctx.confidence = 0.7;
            finish_common(&mut ctx, &folded);
            return ctx;
        }

        ctx.intent = Intent::Tabular;
        ctx.strategy = Strategy::StructuredOnly;
        ctx.prepend_dataset(DatasetId::UrbanRegime);
        ctx.require_dataset(DatasetId::ZoneNeighborhoods);
        ctx.confidence = if ctx.entities.neighborhoods.is_empty() && short_place_query {
            // Short phrase that is not in the gazetteer: still routed as a
            // neighborhood lookup, with lower conviction.
            0.7
        } else {
            0.85
        };
    } else if ctx.signals.wants_definition {
        ctx.intent = Intent::Conceptual;
        ctx.strategy = Strategy::UnstructuredOnly;
        ctx.confidence = 0.8;
    } else if ctx.signals.has_legal_signals {
        ctx.intent = Intent::Hybrid;
        ctx.strategy = Strategy::Hybrid;
        ctx.confidence = 0.8;
    } else {
        ctx.intent = Intent::Hybrid;
        ctx.strategy = Strategy::Hybrid;
        ctx.confidence = 0.7;
    }

    // Rule 4: street named without a recognizable neighborhood.
    if contains_any(&folded, STREET_TERMS) && ctx.entities.neighborhoods.is_empty() {
        ctx.needs_clarification = Some(CLARIFICATION_PROMPT.to_string());
    }

    finish_common(&mut ctx, &folded);
    ctx
}

fn collect_parameters(folded: &str, ctx: &mut Context) {
    if contains_any(folded, HEIGHT_TERMS) {
        ctx.entities.parameters.insert("altura".to_string());
    }
    if contains_any(folded, UTILIZATION_TERMS) {
        ctx.entities
            .parameters
            .insert("coeficiente de aproveitamento".to_string());
    }
    if contains_any(folded, OCCUPANCY_TERMS) {
        ctx.entities
            .parameters
            .insert("taxa de ocupacao".to_string());
    }
    if folded.contains("permeabilidade") {
        ctx.entities
            .parameters
            .insert("taxa de permeabilidade".to_string());
    }
}

fn finish_common(ctx: &mut Context, folded: &str) {
    if ctx.signals.has_legal_signals || folded.contains("documento") {
        ctx.require_dataset(DatasetId::DocumentSections);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_objectives_short_circuit() {
        let ctx = analyze_local("quais são os principais objetivos do plano diretor?");
        assert_eq!(ctx.intent, Intent::Predefined);
        assert_eq!(ctx.strategy, Strategy::Predefined);
        assert!((ctx.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counting_query_is_never_construction() {
        let ctx = analyze_local("quantos bairros existem");
        assert!(ctx.is_counting_query);
        assert!(!ctx.is_construction_query);
        assert_eq!(ctx.strategy, Strategy::StructuredOnly);
        assert_eq!(ctx.required_datasets, vec![DatasetId::ZoneNeighborhoods]);
    }

    #[test]
    fn counting_beats_construction_even_with_neighborhood() {
        let ctx = analyze_local("quantas zonas tem o bairro petrópolis?");
        assert!(ctx.is_counting_query);
        assert!(!ctx.is_construction_query);
        assert!(ctx.entities.neighborhoods.contains("PETRÓPOLIS"));
    }

    #[test]
    fn aggregate_height_is_tabular_not_construction() {
        let ctx = analyze_local("qual a altura máxima mais alta de porto alegre?");
        assert!(ctx.is_counting_query);
        assert!(!ctx.is_construction_query);
        assert_eq!(ctx.required_datasets, vec![DatasetId::UrbanRegime]);
    }

    #[test]
    fn short_place_name_routes_as_construction() {
        let ctx = analyze_local("três figueiras");
        assert_eq!(ctx.intent, Intent::Tabular);
        assert!(ctx.is_construction_query);
        assert_eq!(ctx.strategy, Strategy::StructuredOnly);
        assert_eq!(ctx.required_datasets[0], DatasetId::UrbanRegime);
        assert!(ctx.entities.neighborhoods.contains("TRÊS FIGUEIRAS"));
    }

    #[test]
    fn short_unknown_place_name_still_routes_tabular() {
        // Preserved quirk: a short phrase that is not in the gazetteer and
        // not a construction term still gets the tabular treatment.
        let ctx = analyze_local("vila imaginária");
        assert!(ctx.is_construction_query);
        assert_eq!(ctx.strategy, Strategy::StructuredOnly);
        assert!(ctx.confidence < 0.85);
    }

    #[test]
    fn construction_terms_with_neighborhood() {
        let ctx = analyze_local("o que posso construir no bairro cristal?");
        assert!(ctx.is_construction_query);
        assert_eq!(ctx.strategy, Strategy::StructuredOnly);
        assert!(ctx.entities.neighborhoods.contains("CRISTAL"));
        assert_eq!(ctx.required_datasets[0], DatasetId::UrbanRegime);
    }

    #[test]
    fn city_name_alone_demotes_to_conceptual() {
        let ctx = analyze_local("qual a altura máxima em porto alegre?");
        assert!(!ctx.is_construction_query);
        assert_eq!(ctx.intent, Intent::Conceptual);
        assert!(ctx.entities.neighborhoods.is_empty());
    }

    #[test]
    fn street_without_neighborhood_needs_clarification() {
        let ctx = analyze_local("posso construir na avenida ipiranga 1200?");
        assert!(ctx.needs_clarification.is_some());
    }

    #[test]
    fn street_with_neighborhood_needs_no_clarification() {
        let ctx = analyze_local("posso construir na rua padre cacique no bairro cristal?");
        assert!(ctx.needs_clarification.is_none());
        assert!(ctx.entities.neighborhoods.contains("CRISTAL"));
    }

    #[test]
    fn risk_terms_add_risk_dataset() {
        let ctx = analyze_local("quais bairros têm risco de inundação acima da cota?");
        assert!(ctx.is_risk_query);
        assert!(ctx.required_datasets.contains(&DatasetId::DisasterRisk));
    }

    #[test]
    fn legal_query_requires_document_sections() {
        let ctx = analyze_local("qual artigo da luos trata da certificação ambiental?");
        assert!(ctx.signals.has_legal_signals);
        assert!(ctx.required_datasets.contains(&DatasetId::DocumentSections));
    }

    #[test]
    fn definition_query_is_conceptual() {
        let ctx = analyze_local("o que é estudo de impacto de vizinhança e como funciona na prática em áreas urbanas consolidadas?");
        // Legal term "estudo de impacto" is present but the definition comes
        // after construction-family checks; EIV has no construction terms.
        assert!(ctx.signals.wants_definition);
    }

    #[test]
    fn complexity_thresholds() {
        let short = analyze_local("cristal");
        assert_eq!(short.complexity, Complexity::Low);

        let medium = analyze_local(
            "quais são os parâmetros do cristal e da tristeza e do menino deus e de ipanema e do lami juntos",
        );
        assert_eq!(medium.complexity, Complexity::Medium);

        let comparison = analyze_local("cristal versus tristeza");
        assert_eq!(comparison.complexity, Complexity::High);
    }

    #[test]
    fn boa_vista_do_sul_extraction() {
        let ctx = analyze_local("o que posso construir em boa vista do sul?");
        assert!(ctx.entities.neighborhoods.contains("BOA VISTA DO SUL"));
        assert!(!ctx.entities.neighborhoods.contains("BOA VISTA"));

        let ctx = analyze_local("o que posso construir na boa vista?");
        assert!(ctx.entities.neighborhoods.contains("BOA VISTA"));
    }
}
