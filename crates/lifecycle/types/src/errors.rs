//! Error types for the lifecycle layer

use crate::{EntityId, EntityKind, StageId};
use serde::{Deserialize, Serialize};

/// Why a transition attempt was refused.
///
/// This is the closed taxonomy callers branch on. Every variant is also
/// recorded as a rejected [`TransitionEvent`](crate::TransitionEvent).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid transition for {kind}: {from} -> {to}")]
    InvalidTransition {
        kind: EntityKind,
        from: StageId,
        to: StageId,
    },

    #[error("Gate on stage {stage} not satisfied: {missing_count} required item(s) incomplete")]
    GateNotSatisfied {
        stage: StageId,
        missing_count: usize,
        /// Identifiers of the incomplete required items, in catalog order
        missing: Vec<String>,
    },

    #[error("Stale state: caller expected {expected}, entity is at {actual}")]
    StaleState { expected: StageId, actual: StageId },
}

impl TransitionError {
    /// The flat error kind, as stored on rejected events
    pub fn kind(&self) -> TransitionErrorKind {
        match self {
            Self::InvalidTransition { .. } => TransitionErrorKind::InvalidTransition,
            Self::GateNotSatisfied { .. } => TransitionErrorKind::GateNotSatisfied,
            Self::StaleState { .. } => TransitionErrorKind::StaleState,
        }
    }

    /// Missing checklist items for gate failures, zero otherwise
    pub fn missing_count(&self) -> usize {
        match self {
            Self::GateNotSatisfied { missing_count, .. } => *missing_count,
            _ => 0,
        }
    }

    /// Whether the caller may retry after re-reading the current stage
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleState { .. })
    }
}

/// Discriminant of [`TransitionError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionErrorKind {
    InvalidTransition,
    GateNotSatisfied,
    StaleState,
}

impl std::fmt::Display for TransitionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition => write!(f, "InvalidTransition"),
            Self::GateNotSatisfied => write!(f, "GateNotSatisfied"),
            Self::StaleState => write!(f, "StaleState"),
        }
    }
}

/// Errors raised while building or querying stage catalogs
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("No catalog configured for entity kind {0}")]
    MissingCatalog(EntityKind),

    #[error("Duplicate catalog for entity kind {0}")]
    DuplicateCatalog(EntityKind),

    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(String),

    #[error("Stage {stage} is not part of the {kind} catalog")]
    UnknownStage { kind: EntityKind, stage: StageId },

    #[error("Duplicate stage {stage} in the {kind} catalog")]
    DuplicateStage { kind: EntityKind, stage: StageId },

    #[error("Duplicate transition in the {kind} catalog: {from} -> {to}")]
    DuplicateTransition {
        kind: EntityKind,
        from: StageId,
        to: StageId,
    },

    #[error("Terminal stage {stage} in the {kind} catalog has outgoing transitions")]
    TerminalHasTransitions { kind: EntityKind, stage: StageId },

    #[error("Non-terminal stage {stage} in the {kind} catalog has no outgoing transitions")]
    DeadEnd { kind: EntityKind, stage: StageId },

    #[error("Stage {stage} in the {kind} catalog cannot reach any terminal stage")]
    NoReachableTerminal { kind: EntityKind, stage: StageId },

    #[error("The {0} catalog has no stages")]
    Empty(EntityKind),

    #[error("Catalog validation error: {0}")]
    Validation(String),
}

/// Errors raised by history stores
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("Event for {entity_id} is older than the latest recorded event")]
    OutOfOrder { entity_id: EntityId },

    #[error("History for {entity_id} is inconsistent: {detail}")]
    Inconsistent { entity_id: EntityId, detail: String },

    #[error("History backend error: {0}")]
    Backend(String),
}

/// Top-level error for lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LifecycleError {
    /// The transition rejection, if this error is one
    pub fn as_transition(&self) -> Option<&TransitionError> {
        match self {
            Self::Transition(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for history store operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Result type alias for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_kind() {
        let err = TransitionError::GateNotSatisfied {
            stage: StageId::new("SIGN"),
            missing_count: 1,
            missing: vec!["signature_collected".into()],
        };
        assert_eq!(err.kind(), TransitionErrorKind::GateNotSatisfied);
        assert_eq!(err.missing_count(), 1);
        assert!(!err.is_retryable());

        let stale = TransitionError::StaleState {
            expected: StageId::new("QUEUED"),
            actual: StageId::new("ACTIVE"),
        };
        assert!(stale.is_retryable());
        assert_eq!(stale.missing_count(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = TransitionError::InvalidTransition {
            kind: EntityKind::Contract,
            from: StageId::new("PROPOSAL"),
            to: StageId::new("BID_APPROVED"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition for contract: PROPOSAL -> BID_APPROVED"
        );
    }

    #[test]
    fn test_lifecycle_error_from_transition() {
        let err: LifecycleError = TransitionError::StaleState {
            expected: StageId::new("A"),
            actual: StageId::new("B"),
        }
        .into();
        assert!(err.as_transition().is_some());

        let err: LifecycleError = HistoryError::Backend("disk full".into()).into();
        assert!(err.as_transition().is_none());
    }
}
