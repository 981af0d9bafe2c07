//! Process entities: the records that move through stages
//!
//! A ProcessEntity is owned by the caller's persistence layer. The engine
//! receives it as a value and hands back an updated value; it never keeps
//! entities itself. The current stage is private and only changes by
//! applying an applied transition event.

use crate::{CatalogError, HistoryError, HistoryResult, StageId, TransitionEvent, WorkStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ── Entity Kind ──────────────────────────────────────────────────────

/// The domains that participate in stage lifecycles
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contract,
    Lead,
    ExecutionPlan,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Contract, Self::Lead, Self::ExecutionPlan];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Lead => "lead",
            Self::ExecutionPlan => "execution_plan",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "contract" => Ok(Self::Contract),
            "lead" => Ok(Self::Lead),
            "execution_plan" | "plan" => Ok(Self::ExecutionPlan),
            other => Err(CatalogError::UnknownEntityKind(other.to_string())),
        }
    }
}

// ── Entity Identifier ────────────────────────────────────────────────

/// Unique identifier for a process entity
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an entity across kinds.
///
/// Ids are only unique within a kind: contract `42` and lead `42` are
/// different entities with separate histories.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

// ── Work Items ───────────────────────────────────────────────────────

/// A child work item (milestone or task summary) attached to an entity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub label: String,
    pub status: WorkStatus,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, status: WorkStatus) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            status,
        }
    }
}

// ── Process Entity ───────────────────────────────────────────────────

/// A record moving through one kind's stage catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    stage: StageId,
    pub created_at: DateTime<Utc>,
    /// Set by the first applied transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Percent through the catalog at the current stage. Derived, not
    /// authoritative; the lifecycle service fills it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_items: Vec<WorkItem>,
}

impl ProcessEntity {
    /// Create an entity in its catalog's initial stage.
    ///
    /// Callers normally go through the catalog registry, which supplies the
    /// correct initial stage for `kind`.
    pub fn new(id: EntityId, kind: EntityKind, initial_stage: StageId) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            stage: initial_stage,
            created_at: now,
            activated_at: None,
            updated_at: now,
            progress: None,
            work_items: Vec::new(),
        }
    }

    pub fn with_work_item(mut self, item: WorkItem) -> Self {
        self.work_items.push(item);
        self
    }

    pub fn stage(&self) -> &StageId {
        &self.stage
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind, self.id.clone())
    }

    /// Apply an applied transition event, moving the entity to its target stage.
    ///
    /// The event must belong to this entity, be applied, and start from the
    /// entity's current stage.
    pub fn apply(&mut self, event: &TransitionEvent) -> HistoryResult<()> {
        if event.entity_id != self.id || event.kind != self.kind {
            return Err(HistoryError::Inconsistent {
                entity_id: self.id.clone(),
                detail: format!("event {} belongs to {}", event.id, event.entity_id),
            });
        }
        if !event.is_applied() {
            return Err(HistoryError::Inconsistent {
                entity_id: self.id.clone(),
                detail: format!("event {} was rejected and cannot be applied", event.id),
            });
        }
        if event.from_stage != self.stage {
            return Err(HistoryError::Inconsistent {
                entity_id: self.id.clone(),
                detail: format!(
                    "event {} starts at {} but entity is at {}",
                    event.id, event.from_stage, self.stage
                ),
            });
        }

        self.stage = event.to_stage.clone();
        self.updated_at = event.timestamp;
        if self.activated_at.is_none() {
            self.activated_at = Some(event.timestamp);
        }
        Ok(())
    }

    /// Rebuild an entity from its initial stage and its ordered history.
    /// Rejected events are skipped.
    pub fn replay<'a, I>(
        id: EntityId,
        kind: EntityKind,
        initial_stage: StageId,
        created_at: DateTime<Utc>,
        events: I,
    ) -> HistoryResult<Self>
    where
        I: IntoIterator<Item = &'a TransitionEvent>,
    {
        let mut entity = Self::new(id, kind, initial_stage);
        entity.created_at = created_at;
        entity.updated_at = created_at;
        for event in events.into_iter().filter(|e| e.is_applied()) {
            entity.apply(event)?;
        }
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActorId, TransitionError, TransitionRequest};

    fn entity() -> ProcessEntity {
        ProcessEntity::new(
            EntityId::new("c-1"),
            EntityKind::Contract,
            StageId::new("PROPOSAL"),
        )
    }

    #[test]
    fn test_entity_kind_parse() {
        assert_eq!("contract".parse::<EntityKind>().unwrap(), EntityKind::Contract);
        assert_eq!("Lead".parse::<EntityKind>().unwrap(), EntityKind::Lead);
        assert_eq!(
            "execution-plan".parse::<EntityKind>().unwrap(),
            EntityKind::ExecutionPlan
        );
        assert!(matches!(
            "affiliate".parse::<EntityKind>(),
            Err(CatalogError::UnknownEntityKind(_))
        ));
    }

    #[test]
    fn test_same_id_different_kind_is_a_different_key() {
        let contract = entity();
        let lead = ProcessEntity::new(EntityId::new("c-1"), EntityKind::Lead, StageId::new("NEW"));
        assert_ne!(contract.key(), lead.key());
        assert_eq!(lead.key().to_string(), "lead/c-1");
    }

    #[test]
    fn test_apply_applied_event() {
        let mut e = entity();
        let req = TransitionRequest::for_entity(&e, "BID_SUBMITTED", ActorId::new("u"));
        let event = TransitionEvent::applied(&req, Utc::now());

        e.apply(&event).unwrap();
        assert_eq!(e.stage(), &StageId::new("BID_SUBMITTED"));
        assert_eq!(e.activated_at, Some(event.timestamp));
    }

    #[test]
    fn test_apply_rejects_rejected_event() {
        let mut e = entity();
        let req = TransitionRequest::for_entity(&e, "BID_APPROVED", ActorId::new("u"));
        let err = TransitionError::InvalidTransition {
            kind: EntityKind::Contract,
            from: StageId::new("PROPOSAL"),
            to: StageId::new("BID_APPROVED"),
        };
        let event = TransitionEvent::rejected(&req, &err, Utc::now());

        assert!(e.apply(&event).is_err());
        assert_eq!(e.stage(), &StageId::new("PROPOSAL"));
    }

    #[test]
    fn test_apply_rejects_mismatched_origin() {
        let mut e = entity();
        let req = TransitionRequest::new(
            e.id.clone(),
            EntityKind::Contract,
            "QUEUED",
            "ACTIVE",
            ActorId::new("u"),
        );
        let event = TransitionEvent::applied(&req, Utc::now());
        assert!(matches!(
            e.apply(&event),
            Err(HistoryError::Inconsistent { .. })
        ));
    }

    #[test]
    fn test_replay_skips_rejections() {
        let seed = entity();
        let first = TransitionRequest::for_entity(&seed, "BID_SUBMITTED", ActorId::new("u"));
        let bad = TransitionRequest::new(
            seed.id.clone(),
            EntityKind::Contract,
            "BID_SUBMITTED",
            "ACTIVE",
            ActorId::new("u"),
        );
        let err = TransitionError::InvalidTransition {
            kind: EntityKind::Contract,
            from: StageId::new("BID_SUBMITTED"),
            to: StageId::new("ACTIVE"),
        };
        let events = vec![
            TransitionEvent::applied(&first, Utc::now()),
            TransitionEvent::rejected(&bad, &err, Utc::now()),
        ];

        let rebuilt = ProcessEntity::replay(
            seed.id.clone(),
            seed.kind,
            StageId::new("PROPOSAL"),
            seed.created_at,
            &events,
        )
        .unwrap();
        assert_eq!(rebuilt.stage(), &StageId::new("BID_SUBMITTED"));
    }
}
