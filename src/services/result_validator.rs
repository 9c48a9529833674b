//! Validation pass over the ranked result list.
//!
//! Computes the mean agent confidence and collects consistency issues:
//! contradictory legal citations, an all-empty evidence set, and scope
//! problems reported by the validator agent.

use std::collections::HashMap;

use crate::domain::models::{AgentPayload, RankedResult, ValidationResult};

/// Validate one execution round.
pub fn validate(ranked: &[RankedResult]) -> ValidationResult {
    if ranked.is_empty() {
        return ValidationResult::new(0.0, vec!["nenhum agente retornou resultado".to_string()]);
    }

    let mean_confidence = ranked
        .iter()
        .map(|r| r.result.confidence)
        .sum::<f64>()
        / ranked.len() as f64;

    let mut issues = Vec::new();

    // The same citation reported by two separate legal results points at a
    // retrieval inconsistency, not corroboration.
    let mut citation_sources: HashMap<&str, usize> = HashMap::new();
    for (idx, item) in ranked.iter().enumerate() {
        if let AgentPayload::Legal { citations, .. } = &item.result.payload {
            for citation in citations {
                match citation_sources.get(citation.as_str()) {
                    Some(&first) if first != idx => {
                        issues.push(format!("citação legal duplicada: {citation}"));
                    }
                    Some(_) => {}
                    None => {
                        citation_sources.insert(citation.as_str(), idx);
                    }
                }
            }
        }
    }

    if ranked.iter().all(|r| r.result.payload.has_empty_values()) {
        issues.push("nenhum agente retornou dados".to_string());
    }

    for item in ranked {
        if let AgentPayload::Validator {
            valid, issues: scope_issues, ..
        } = &item.result.payload
        {
            if !valid {
                issues.extend(scope_issues.iter().cloned());
            }
        }
    }

    issues.dedup();
    ValidationResult::new(mean_confidence, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        AgentKind, AgentResult, CriteriaScores, RegimeRow, CONFIDENCE_FLOOR,
    };

    fn ranked(result: AgentResult) -> RankedResult {
        RankedResult::new(
            result,
            CriteriaScores {
                confidence: result_confidence_placeholder(),
                priority: 0.8,
                relevance: 0.7,
                completeness: 0.7,
                authority: 0.7,
            },
        )
    }

    fn result_confidence_placeholder() -> f64 {
        0.8
    }

    fn structured(confidence: f64) -> AgentResult {
        AgentResult::new(
            AgentKind::Structured,
            confidence,
            AgentPayload::Structured {
                response: "CRISTAL (ZOT 05)".to_string(),
                rows: vec![RegimeRow {
                    neighborhood: "CRISTAL".to_string(),
                    zone: "ZOT 05".to_string(),
                    max_height_m: Some(42.0),
                    base_utilization_coefficient: None,
                    max_utilization_coefficient: None,
                    occupancy_rate: None,
                }],
                memberships: Vec::new(),
                count: None,
            },
        )
    }

    fn legal_with_citation(citation: &str) -> AgentResult {
        AgentResult::new(
            AgentKind::Legal,
            0.85,
            AgentPayload::Legal {
                response: citation.to_string(),
                citations: vec![citation.to_string()],
                laws: vec!["LUOS".to_string()],
                passages: Vec::new(),
            },
        )
    }

    #[test]
    fn mean_confidence_below_floor_requires_refinement() {
        let verdict = validate(&[ranked(structured(0.5)), ranked(structured(0.6))]);
        assert!(verdict.confidence < CONFIDENCE_FLOOR);
        assert!(verdict.requires_refinement);
    }

    #[test]
    fn duplicate_citations_across_results_flagged() {
        let verdict = validate(&[
            ranked(legal_with_citation("Art. 86")),
            ranked(legal_with_citation("Art. 86")),
        ]);
        assert!(!verdict.is_valid);
        assert!(verdict.issues.iter().any(|i| i.contains("Art. 86")));
    }

    #[test]
    fn same_result_repeating_a_citation_is_not_duplicate() {
        let mut result = legal_with_citation("Art. 86");
        if let AgentPayload::Legal { citations, .. } = &mut result.payload {
            citations.push("Art. 86".to_string());
        }
        let verdict = validate(&[ranked(result)]);
        assert!(verdict.is_valid);
    }

    #[test]
    fn all_empty_payloads_flagged() {
        let degraded = AgentResult::degraded(AgentKind::Structured, "timeout");
        let verdict = validate(&[ranked(degraded)]);
        assert!(verdict.issues.iter().any(|i| i.contains("nenhum agente")));
        assert!(verdict.requires_refinement);
    }

    #[test]
    fn scope_issues_from_validator_agent_propagate() {
        let validator = AgentResult::new(
            AgentKind::Validator,
            0.9,
            AgentPayload::Validator {
                valid: false,
                issues: vec!["Consulta sobre tributação (IPTU) está fora do escopo.".to_string()],
                available_domains: vec!["regime_urbanistico".to_string()],
            },
        );
        let verdict = validate(&[ranked(structured(0.9)), ranked(validator)]);
        assert!(verdict.issues.iter().any(|i| i.contains("IPTU")));
    }

    #[test]
    fn empty_round_is_invalid() {
        let verdict = validate(&[]);
        assert!(!verdict.is_valid);
        assert!(verdict.requires_refinement);
    }
}
