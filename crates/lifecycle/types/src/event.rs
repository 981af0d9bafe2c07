//! Transition requests and audit events
//!
//! Every transition attempt, applied or rejected, produces exactly one
//! [`TransitionEvent`]. Events are immutable once built and are only ever
//! appended to a history store.

use crate::{
    EntityId, EntityKey, EntityKind, ProcessEntity, StageId, TransitionError, TransitionErrorKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a transition event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// First eight characters, for display
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(8)
            .map_or(&self.0[..], |(i, _)| &self.0[..i])
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user or system that requested a transition
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Transition Request ───────────────────────────────────────────────

/// A caller's request to move one entity to another stage.
///
/// `expected_stage` is the stage the caller believes the entity is in.
/// If the authoritative stage differs, the request is stale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub entity_id: EntityId,
    pub kind: EntityKind,
    pub expected_stage: StageId,
    pub requested_stage: StageId,
    pub actor: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TransitionRequest {
    pub fn new(
        entity_id: EntityId,
        kind: EntityKind,
        expected_stage: impl Into<String>,
        requested_stage: impl Into<String>,
        actor: ActorId,
    ) -> Self {
        Self {
            entity_id,
            kind,
            expected_stage: StageId::new(expected_stage),
            requested_stage: StageId::new(requested_stage),
            actor,
            reason: None,
        }
    }

    /// Request a move of `entity` from the stage the caller currently holds
    pub fn for_entity(entity: &ProcessEntity, to: impl Into<String>, actor: ActorId) -> Self {
        Self {
            entity_id: entity.id.clone(),
            kind: entity.kind,
            expected_stage: entity.stage().clone(),
            requested_stage: StageId::new(to),
            actor,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.entity_id.clone())
    }
}

// ── Transition Event ─────────────────────────────────────────────────

/// Result recorded on a transition event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied,
    Rejected {
        error: TransitionErrorKind,
        detail: String,
    },
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Immutable audit record of one transition attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub id: EventId,
    pub entity_id: EntityId,
    pub kind: EntityKind,
    /// The stage the transition started from, as known by the caller
    pub from_stage: StageId,
    pub to_stage: StageId,
    pub actor: ActorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: TransitionOutcome,
}

impl TransitionEvent {
    /// Record a transition that was applied
    pub fn applied(request: &TransitionRequest, timestamp: DateTime<Utc>) -> Self {
        Self::from_request(request, timestamp, TransitionOutcome::Applied)
    }

    /// Record a transition that was refused
    pub fn rejected(
        request: &TransitionRequest,
        error: &TransitionError,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::from_request(
            request,
            timestamp,
            TransitionOutcome::Rejected {
                error: error.kind(),
                detail: error.to_string(),
            },
        )
    }

    fn from_request(
        request: &TransitionRequest,
        timestamp: DateTime<Utc>,
        outcome: TransitionOutcome,
    ) -> Self {
        Self {
            id: EventId::generate(),
            entity_id: request.entity_id.clone(),
            kind: request.kind,
            from_stage: request.expected_stage.clone(),
            to_stage: request.requested_stage.clone(),
            actor: request.actor.clone(),
            reason: request.reason.clone(),
            timestamp,
            outcome,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome.is_applied()
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.entity_id.clone())
    }

    /// The rejection kind, if this event records a refused attempt
    pub fn rejection(&self) -> Option<TransitionErrorKind> {
        match &self.outcome {
            TransitionOutcome::Rejected { error, .. } => Some(*error),
            TransitionOutcome::Applied => None,
        }
    }
}

impl std::fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            TransitionOutcome::Applied => write!(
                f,
                "{} {}→{} applied by {}",
                self.entity_id, self.from_stage, self.to_stage, self.actor
            ),
            TransitionOutcome::Rejected { error, .. } => write!(
                f,
                "{} {}→{} rejected ({}) for {}",
                self.entity_id, self.from_stage, self.to_stage, error, self.actor
            ),
        }
    }
}
