//! Gate evaluator: checks a stage's checklist requirement
//!
//! Pure evaluation. Checklist data is supplied fresh by the caller on every
//! call and nothing is cached between calls.

use crate::catalog::StageCatalog;
use lifecycle_types::{ChecklistStatus, GateDefinition, StageId};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one stage's gate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateEvaluation {
    pub stage: StageId,
    pub passed: bool,
    pub required_count: usize,
    pub missing_count: usize,
    /// Incomplete required items, in gate order
    pub missing: Vec<String>,
}

impl GateEvaluation {
    fn open(stage: &StageId) -> Self {
        Self {
            stage: stage.clone(),
            passed: true,
            required_count: 0,
            missing_count: 0,
            missing: Vec::new(),
        }
    }
}

/// Evaluates stage gates against checklist status
#[derive(Clone, Debug, Default)]
pub struct GateEvaluator;

impl GateEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the gate on `stage`.
    ///
    /// Ungated and unknown stages pass with nothing missing. Items in the
    /// checklist that the gate does not require are ignored.
    pub fn evaluate(
        &self,
        catalog: &StageCatalog,
        stage: &StageId,
        checklist: &ChecklistStatus,
    ) -> GateEvaluation {
        match catalog.gate_for(stage) {
            Some(gate) => self.evaluate_definition(stage, gate, checklist),
            None => GateEvaluation::open(stage),
        }
    }

    pub fn evaluate_definition(
        &self,
        stage: &StageId,
        gate: &GateDefinition,
        checklist: &ChecklistStatus,
    ) -> GateEvaluation {
        let missing: Vec<String> = gate
            .required_items
            .iter()
            .filter(|item| !checklist.is_complete(item))
            .cloned()
            .collect();

        tracing::debug!(
            stage = %stage,
            required = gate.required_count(),
            missing = missing.len(),
            "Gate evaluated"
        );

        GateEvaluation {
            stage: stage.clone(),
            passed: missing.is_empty(),
            required_count: gate.required_count(),
            missing_count: missing.len(),
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogRegistry;
    use lifecycle_types::EntityKind;
    use proptest::prelude::*;

    fn lead() -> StageCatalog {
        CatalogRegistry::builtin()
            .unwrap()
            .catalog(EntityKind::Lead)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_partial_checklist() {
        let checklist = ChecklistStatus::new()
            .with_item("agreement_reviewed", true)
            .with_item("signature_collected", false);
        let eval = GateEvaluator::new().evaluate(&lead(), &"SIGN".into(), &checklist);
        assert!(!eval.passed);
        assert_eq!(eval.missing_count, 1);
        assert_eq!(eval.missing, vec!["signature_collected".to_string()]);
    }

    #[test]
    fn test_complete_checklist() {
        let checklist = ChecklistStatus::completed(["agreement_reviewed", "signature_collected"]);
        let eval = GateEvaluator::new().evaluate(&lead(), &"SIGN".into(), &checklist);
        assert!(eval.passed);
        assert_eq!(eval.required_count, 2);
    }

    #[test]
    fn test_ungated_stage_passes() {
        let eval = GateEvaluator::new().evaluate(&lead(), &"NEW".into(), &ChecklistStatus::new());
        assert!(eval.passed);
        assert_eq!(eval.missing_count, 0);
    }

    #[test]
    fn test_extra_items_ignored() {
        let checklist = ChecklistStatus::completed(["agreement_reviewed", "signature_collected"])
            .with_item("unrelated", false);
        assert!(GateEvaluator::new()
            .evaluate(&lead(), &"SIGN".into(), &checklist)
            .passed);
    }

    #[test]
    fn test_empty_gate_passes() {
        let eval = GateEvaluator::new().evaluate_definition(
            &"X".into(),
            &GateDefinition::default(),
            &ChecklistStatus::new(),
        );
        assert!(eval.passed);
    }

    proptest! {
        #[test]
        fn property_missing_count_matches_incomplete_items(flags in prop::collection::vec(any::<bool>(), 0..12)) {
            let items: Vec<String> = (0..flags.len()).map(|i| format!("item-{i}")).collect();
            let gate = GateDefinition::new(items.clone());
            let mut checklist = ChecklistStatus::new();
            for (item, done) in items.iter().zip(&flags) {
                checklist = checklist.with_item(item.clone(), *done);
            }

            let eval = GateEvaluator::new().evaluate_definition(&"S".into(), &gate, &checklist);
            let incomplete = flags.iter().filter(|done| !**done).count();
            prop_assert_eq!(eval.missing_count, incomplete);
            prop_assert_eq!(eval.passed, incomplete == 0);
        }
    }
}
