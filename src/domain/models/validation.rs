//! Validation verdict over a ranked result list.

use serde::{Deserialize, Serialize};

/// Confidence floor below which validation requests refinement and the
/// cache refuses admission.
pub const CONFIDENCE_FLOOR: f64 = 0.7;

/// Outcome of one validation pass. A refined query produces a second,
/// independent instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Mean of the constituent agent confidences.
    pub confidence: f64,
    pub issues: Vec<String>,
    /// True iff `confidence < CONFIDENCE_FLOOR` or `issues` is non-empty.
    pub requires_refinement: bool,
}

impl ValidationResult {
    pub fn new(confidence: f64, issues: Vec<String>) -> Self {
        let requires_refinement = confidence < CONFIDENCE_FLOOR || !issues.is_empty();
        Self {
            is_valid: issues.is_empty(),
            confidence,
            issues,
            requires_refinement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_requires_refinement() {
        let v = ValidationResult::new(0.6, Vec::new());
        assert!(v.is_valid);
        assert!(v.requires_refinement);
    }

    #[test]
    fn issues_require_refinement_even_with_high_confidence() {
        let v = ValidationResult::new(0.95, vec!["duplicate citations".to_string()]);
        assert!(!v.is_valid);
        assert!(v.requires_refinement);
    }

    #[test]
    fn clean_high_confidence_pass() {
        let v = ValidationResult::new(0.85, Vec::new());
        assert!(v.is_valid);
        assert!(!v.requires_refinement);
    }
}
