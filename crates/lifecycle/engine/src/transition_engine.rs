//! Transition engine: decides whether one transition attempt may proceed
//!
//! The engine is pure. Given the authoritative current stage it returns
//! either an applied or a rejected event; persisting that event and locking
//! the entity is the service's job.

use crate::catalog::StageCatalog;
use crate::gate_evaluator::GateEvaluator;
use chrono::{DateTime, Utc};
use lifecycle_types::{ChecklistStatus, StageId, TransitionError, TransitionEvent, TransitionRequest};

/// Result of one attempt: the event to record, plus the rejection if any
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionAttempt {
    pub event: TransitionEvent,
    pub result: Result<(), TransitionError>,
}

impl TransitionAttempt {
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }
}

/// Applies the stage-catalog and gate rules to transition requests
#[derive(Clone, Debug, Default)]
pub struct TransitionEngine {
    gates: GateEvaluator,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self {
            gates: GateEvaluator::new(),
        }
    }

    /// Check `request` against the catalog.
    ///
    /// Checks run in order: stale caller state, then the edge, then the gate
    /// on the stage being left.
    pub fn check(
        &self,
        catalog: &StageCatalog,
        current: &StageId,
        request: &TransitionRequest,
        checklist: &ChecklistStatus,
    ) -> Result<(), TransitionError> {
        if &request.expected_stage != current {
            return Err(TransitionError::StaleState {
                expected: request.expected_stage.clone(),
                actual: current.clone(),
            });
        }

        if request.kind != catalog.kind() || !catalog.allows(current, &request.requested_stage) {
            return Err(TransitionError::InvalidTransition {
                kind: request.kind,
                from: current.clone(),
                to: request.requested_stage.clone(),
            });
        }

        let gate = self.gates.evaluate(catalog, current, checklist);
        if !gate.passed {
            return Err(TransitionError::GateNotSatisfied {
                stage: current.clone(),
                missing_count: gate.missing_count,
                missing: gate.missing,
            });
        }

        Ok(())
    }

    /// Check `request` and build the event recording the outcome
    pub fn attempt(
        &self,
        catalog: &StageCatalog,
        current: &StageId,
        request: &TransitionRequest,
        checklist: &ChecklistStatus,
        timestamp: DateTime<Utc>,
    ) -> TransitionAttempt {
        let result = self.check(catalog, current, request, checklist);
        let event = match &result {
            Ok(()) => TransitionEvent::applied(request, timestamp),
            Err(err) => TransitionEvent::rejected(request, err, timestamp),
        };
        TransitionAttempt { event, result }
    }
}
