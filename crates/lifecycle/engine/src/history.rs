//! Transition history: the append-only audit log of every attempt
//!
//! The history store is the source of truth for an entity's current stage:
//! the target of its most recent applied event, or the catalog's initial
//! stage when nothing has been applied yet. Events are never updated or
//! deleted, and an entity's events carry non-decreasing timestamps.
//!
//! Histories are keyed by [`EntityKey`], so equal ids of different kinds
//! never share a log.

use dashmap::DashMap;
use lifecycle_types::{EntityKey, HistoryError, HistoryResult, TransitionEvent};
use std::sync::Arc;

/// Storage seam for transition events.
///
/// Implementations must make an appended event visible to the next read for
/// the same entity.
pub trait HistoryStore: Send + Sync {
    /// Append one event. Fails with `OutOfOrder` if the event is older than
    /// the entity's latest recorded event.
    fn append(&self, event: TransitionEvent) -> HistoryResult<()>;

    /// All events for an entity, oldest first
    fn events_for(&self, key: &EntityKey) -> HistoryResult<Vec<TransitionEvent>>;

    /// The most recent event, applied or not
    fn last_event(&self, key: &EntityKey) -> HistoryResult<Option<TransitionEvent>> {
        Ok(self.events_for(key)?.pop())
    }

    /// The most recent applied event; its `to_stage` is the current stage
    fn latest_applied(&self, key: &EntityKey) -> HistoryResult<Option<TransitionEvent>> {
        Ok(self
            .events_for(key)?
            .into_iter()
            .rev()
            .find(TransitionEvent::is_applied))
    }

    /// Rejected attempts, oldest first
    fn rejected_for(&self, key: &EntityKey) -> HistoryResult<Vec<TransitionEvent>> {
        Ok(self
            .events_for(key)?
            .into_iter()
            .filter(|e| !e.is_applied())
            .collect())
    }

    fn event_count(&self, key: &EntityKey) -> HistoryResult<usize> {
        Ok(self.events_for(key)?.len())
    }
}

/// In-process history store.
///
/// Suitable for tests and single-node deployments; durable backends
/// implement [`HistoryStore`] over their own storage.
#[derive(Clone, Debug, Default)]
pub struct InMemoryHistoryStore {
    events: Arc<DashMap<EntityKey, Vec<TransitionEvent>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities with at least one event
    pub fn entity_count(&self) -> usize {
        self.events.len()
    }

    /// Total events across all entities
    pub fn total_count(&self) -> usize {
        self.events.iter().map(|entry| entry.value().len()).sum()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, event: TransitionEvent) -> HistoryResult<()> {
        let mut log = self.events.entry(event.key()).or_default();
        if let Some(last) = log.last() {
            if event.timestamp < last.timestamp {
                return Err(HistoryError::OutOfOrder {
                    entity_id: event.entity_id,
                });
            }
        }

        tracing::trace!(
            entity = %event.key(),
            event_id = %event.id.short(),
            applied = event.is_applied(),
            "Transition event recorded"
        );
        log.push(event);
        Ok(())
    }

    fn events_for(&self, key: &EntityKey) -> HistoryResult<Vec<TransitionEvent>> {
        Ok(self
            .events
            .get(key)
            .map(|log| log.clone())
            .unwrap_or_default())
    }

    fn last_event(&self, key: &EntityKey) -> HistoryResult<Option<TransitionEvent>> {
        Ok(self
            .events
            .get(key)
            .and_then(|log| log.last().cloned()))
    }

    fn latest_applied(&self, key: &EntityKey) -> HistoryResult<Option<TransitionEvent>> {
        Ok(self.events.get(key).and_then(|log| {
            log.iter()
                .rev()
                .find(|e| e.is_applied())
                .cloned()
        }))
    }

    fn event_count(&self, key: &EntityKey) -> HistoryResult<usize> {
        Ok(self.events.get(key).map_or(0, |log| log.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use lifecycle_types::{
        ActorId, EntityId, EntityKind, StageId, TransitionError, TransitionRequest,
    };

    fn request(from: &str, to: &str) -> TransitionRequest {
        TransitionRequest::new(
            EntityId::new("c-1"),
            EntityKind::Contract,
            from,
            to,
            ActorId::new("ops"),
        )
    }

    #[test]
    fn test_append_and_read_back() {
        let store = InMemoryHistoryStore::new();
        let id = EntityKey::new(EntityKind::Contract, EntityId::new("c-1"));
        let now = Utc::now();

        store
            .append(TransitionEvent::applied(&request("PROPOSAL", "BID_SUBMITTED"), now))
            .unwrap();
        let err = TransitionError::InvalidTransition {
            kind: EntityKind::Contract,
            from: StageId::new("BID_SUBMITTED"),
            to: StageId::new("ACTIVE"),
        };
        store
            .append(TransitionEvent::rejected(
                &request("BID_SUBMITTED", "ACTIVE"),
                &err,
                now,
            ))
            .unwrap();

        assert_eq!(store.event_count(&id).unwrap(), 2);
        assert_eq!(store.rejected_for(&id).unwrap().len(), 1);
        assert!(!store.last_event(&id).unwrap().unwrap().is_applied());
        assert_eq!(
            store.latest_applied(&id).unwrap().unwrap().to_stage,
            StageId::new("BID_SUBMITTED")
        );
    }

    #[test]
    fn test_out_of_order_rejected() {
        let store = InMemoryHistoryStore::new();
        let now = Utc::now();
        store
            .append(TransitionEvent::applied(&request("PROPOSAL", "BID_SUBMITTED"), now))
            .unwrap();

        let earlier = now - Duration::seconds(5);
        let err = store
            .append(TransitionEvent::applied(
                &request("BID_SUBMITTED", "BID_APPROVED"),
                earlier,
            ))
            .unwrap_err();
        assert!(matches!(err, HistoryError::OutOfOrder { .. }));
        assert_eq!(store.total_count(), 1);
    }

    #[test]
    fn test_unknown_entity_is_empty() {
        let store = InMemoryHistoryStore::new();
        let id = EntityKey::new(EntityKind::Lead, EntityId::new("nobody"));
        assert!(store.events_for(&id).unwrap().is_empty());
        assert!(store.latest_applied(&id).unwrap().is_none());
        assert_eq!(store.event_count(&id).unwrap(), 0);
        assert_eq!(store.entity_count(), 0);
    }

    #[test]
    fn test_same_id_across_kinds_kept_apart() {
        let store = InMemoryHistoryStore::new();
        let id = EntityId::new("42");
        store
            .append(TransitionEvent::applied(
                &TransitionRequest::new(
                    id.clone(),
                    EntityKind::Contract,
                    "PROPOSAL",
                    "BID_SUBMITTED",
                    ActorId::new("ops"),
                ),
                Utc::now(),
            ))
            .unwrap();

        let lead = EntityKey::new(EntityKind::Lead, id.clone());
        assert!(store.events_for(&lead).unwrap().is_empty());
        assert!(store.latest_applied(&lead).unwrap().is_none());

        let contract = EntityKey::new(EntityKind::Contract, id);
        assert_eq!(store.event_count(&contract).unwrap(), 1);
        assert_eq!(store.entity_count(), 1);
    }

    #[test]
    fn test_default_methods_on_trait_object() {
        let store: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
        let id = EntityKey::new(EntityKind::Contract, EntityId::new("c-1"));
        store
            .append(TransitionEvent::applied(&request("PROPOSAL", "BID_SUBMITTED"), Utc::now()))
            .unwrap();
        assert_eq!(store.rejected_for(&id).unwrap().len(), 0);
    }
}
