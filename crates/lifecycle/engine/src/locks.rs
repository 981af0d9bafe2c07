//! Per-entity mutual exclusion
//!
//! Transition attempts on the same entity run one at a time. Attempts on
//! different entities, including equal ids of different kinds, never share
//! a lock. A lock lives only while someone holds or waits on it.

use dashmap::DashMap;
use lifecycle_types::EntityKey;
use parking_lot::Mutex;
use std::sync::Arc;

/// Lazily created lock per entity
#[derive(Debug, Default)]
pub struct EntityLocks {
    locks: DashMap<EntityKey, Arc<Mutex<()>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `key`. Hold its guard for the whole read-check-append
    /// sequence, then drop the handle and call [`release`](Self::release).
    pub fn handle(&self, key: &EntityKey) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock for `key` if the map holds the only reference.
    ///
    /// Runs under the shard lock that `handle` also takes, so a caller
    /// cannot pick up a lock that is being removed.
    pub fn release(&self, key: &EntityKey) -> bool {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
    }

    /// Drop locks nobody is holding or waiting on
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifecycle_types::{EntityId, EntityKind};

    fn key(kind: EntityKind, id: &str) -> EntityKey {
        EntityKey::new(kind, EntityId::new(id))
    }

    #[test]
    fn test_same_entity_shares_lock() {
        let locks = EntityLocks::new();
        let a = locks.handle(&key(EntityKind::Contract, "c-1"));
        let b = locks.handle(&key(EntityKind::Contract, "c-1"));
        assert!(Arc::ptr_eq(&a, &b));

        let _guard = a.lock();
        assert!(b.try_lock().is_none());
    }

    #[test]
    fn test_different_entities_independent() {
        let locks = EntityLocks::new();
        let a = locks.handle(&key(EntityKind::Contract, "c-1"));
        let b = locks.handle(&key(EntityKind::Contract, "c-2"));
        let c = locks.handle(&key(EntityKind::Lead, "c-1"));

        let _guard = a.lock();
        assert!(b.try_lock().is_some());
        assert!(c.try_lock().is_some());
    }

    #[test]
    fn test_release_only_when_unheld() {
        let locks = EntityLocks::new();
        let k = key(EntityKind::Lead, "l-1");
        let held = locks.handle(&k);
        let waiting = locks.handle(&k);

        drop(held);
        assert!(!locks.release(&k));
        assert_eq!(locks.len(), 1);

        drop(waiting);
        assert!(locks.release(&k));
        assert!(locks.is_empty());
        assert!(!locks.release(&k));
    }

    #[test]
    fn test_prune_keeps_held_locks() {
        let locks = EntityLocks::new();
        let held = locks.handle(&key(EntityKind::Contract, "c-1"));
        drop(locks.handle(&key(EntityKind::Contract, "c-2")));

        assert_eq!(locks.prune(), 1);
        assert_eq!(locks.len(), 1);
        drop(held);
        assert_eq!(locks.prune(), 1);
        assert!(locks.is_empty());
    }
}
