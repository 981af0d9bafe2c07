//! Lifecycle service: the entry point for transition attempts
//!
//! The service ties the pieces together. For each attempt it:
//! 1. Takes the entity's lock
//! 2. Reads the authoritative stage from history
//! 3. Runs the transition engine
//! 4. Appends exactly one event, applied or rejected
//! 5. Broadcasts applied events to subscribers
//!
//! Entities themselves are never stored here. Callers pass an entity in and
//! receive the updated value back.

use crate::catalog::StageCatalog;
use crate::config::LifecycleConfig;
use crate::gate_evaluator::{GateEvaluation, GateEvaluator};
use crate::history::{HistoryStore, InMemoryHistoryStore};
use crate::locks::EntityLocks;
use crate::progress::ProgressCalculator;
use crate::registry::CatalogRegistry;
use crate::transition_engine::TransitionEngine;
use chrono::{DateTime, Utc};
use lifecycle_timeline::{TimelineLayout, TimelineLayoutEngine};
use lifecycle_types::{
    ActorId, ChecklistStatus, EntityId, EntityKey, EntityKind, LifecycleResult, Plan,
    ProcessEntity, StageId, TransitionEvent, TransitionRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Source of checklist completion for gated stages.
///
/// Checklist data lives with an external collaborator. It is fetched fresh
/// for every attempt and never cached by the service.
pub trait ChecklistSource: Send + Sync {
    fn checklist_status(
        &self,
        kind: EntityKind,
        stage: &StageId,
        entity_id: &EntityId,
    ) -> LifecycleResult<ChecklistStatus>;
}

/// A legal next stage and whether its gate would currently pass
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTransition {
    pub to: StageId,
    pub gate: GateEvaluation,
}

impl AvailableTransition {
    pub fn is_ready(&self) -> bool {
        self.gate.passed
    }
}

/// Coordinates catalogs, history and locking for transition attempts
pub struct LifecycleService {
    catalogs: Arc<CatalogRegistry>,
    history: Arc<dyn HistoryStore>,
    engine: TransitionEngine,
    gates: GateEvaluator,
    progress: ProgressCalculator,
    timeline: TimelineLayoutEngine,
    locks: EntityLocks,
    applied: broadcast::Sender<TransitionEvent>,
}

impl LifecycleService {
    /// Build a service over `catalogs` and `history`
    pub fn new(catalogs: Arc<CatalogRegistry>, history: Arc<dyn HistoryStore>) -> Self {
        let defaults = LifecycleConfig {
            catalogs: Vec::new(),
            timeline: Default::default(),
            event_channel_capacity: 256,
        };
        Self::assemble(catalogs, history, &defaults)
    }

    /// Build a service from configuration, with an in-memory history store
    pub fn from_config(config: &LifecycleConfig) -> LifecycleResult<Self> {
        let catalogs = Arc::new(CatalogRegistry::from_config(config)?);
        Ok(Self::assemble(
            catalogs,
            Arc::new(InMemoryHistoryStore::new()),
            config,
        ))
    }

    /// Replace the history store
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    fn assemble(
        catalogs: Arc<CatalogRegistry>,
        history: Arc<dyn HistoryStore>,
        config: &LifecycleConfig,
    ) -> Self {
        let (applied, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            catalogs,
            history,
            engine: TransitionEngine::new(),
            gates: GateEvaluator::new(),
            progress: ProgressCalculator::new(),
            timeline: TimelineLayoutEngine::new(config.timeline.clone()),
            locks: EntityLocks::new(),
            applied,
        }
    }

    pub fn catalogs(&self) -> &CatalogRegistry {
        &self.catalogs
    }

    pub fn catalog(&self, kind: EntityKind) -> LifecycleResult<&StageCatalog> {
        Ok(self.catalogs.catalog(kind)?)
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// A new entity in its catalog's initial stage
    pub fn create_entity(&self, kind: EntityKind, id: EntityId) -> LifecycleResult<ProcessEntity> {
        let mut entity = self.catalogs.create_entity(kind, id)?;
        entity.progress = Some(self.stage_progress(kind, entity.stage())?);
        Ok(entity)
    }

    /// The authoritative stage: the target of the latest applied event, or
    /// the initial stage when no transition has been applied.
    pub fn current_stage(&self, kind: EntityKind, entity_id: &EntityId) -> LifecycleResult<StageId> {
        let key = EntityKey::new(kind, entity_id.clone());
        match self.history.latest_applied(&key)? {
            Some(event) => Ok(event.to_stage),
            None => Ok(self.catalog(kind)?.initial_stage().clone()),
        }
    }

    /// Rebuild an entity's current state from its history
    pub fn rebuild(
        &self,
        kind: EntityKind,
        id: EntityId,
        created_at: DateTime<Utc>,
    ) -> LifecycleResult<ProcessEntity> {
        let catalog = self.catalog(kind)?;
        let events = self.history.events_for(&EntityKey::new(kind, id.clone()))?;
        let initial = catalog.initial_stage().clone();
        let mut entity = ProcessEntity::replay(id, kind, initial, created_at, &events)?;
        entity.progress = Some(self.progress.stage_progress(catalog, entity.stage())?);
        Ok(entity)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Attempt one transition.
    ///
    /// Exactly one event is appended, whatever the outcome. On success the
    /// applied event is returned; a refusal surfaces as
    /// `LifecycleError::Transition`.
    pub fn attempt(
        &self,
        request: &TransitionRequest,
        checklist: &ChecklistStatus,
    ) -> LifecycleResult<TransitionEvent> {
        let catalog = self.catalog(request.kind)?;
        let key = request.key();

        let lock = self.locks.handle(&key);
        let result = {
            let _guard = lock.lock();
            self.attempt_locked(catalog, &key, request, checklist)
        };
        drop(lock);
        self.locks.release(&key);

        result
    }

    /// Read-check-append for one request. The caller holds the entity lock.
    fn attempt_locked(
        &self,
        catalog: &StageCatalog,
        key: &EntityKey,
        request: &TransitionRequest,
        checklist: &ChecklistStatus,
    ) -> LifecycleResult<TransitionEvent> {
        let last = self.history.last_event(key)?;
        let current = match self.history.latest_applied(key)? {
            Some(event) => event.to_stage,
            None => catalog.initial_stage().clone(),
        };

        // Keep per-entity timestamps non-decreasing even if the clock steps back.
        let now = Utc::now();
        let now = last.map_or(now, |prev| prev.timestamp.max(now));

        let attempt = self
            .engine
            .attempt(catalog, &current, request, checklist, now);
        self.history.append(attempt.event.clone())?;

        match attempt.result {
            Ok(()) => {
                tracing::info!(
                    entity_id = %request.entity_id,
                    kind = %request.kind,
                    from = %current,
                    to = %request.requested_stage,
                    actor = %request.actor,
                    "Transition applied"
                );
                if self.applied.send(attempt.event.clone()).is_err() {
                    tracing::trace!("No subscribers for applied transition");
                }
                Ok(attempt.event)
            }
            Err(err) => {
                tracing::warn!(
                    entity_id = %request.entity_id,
                    kind = %request.kind,
                    from = %request.expected_stage,
                    to = %request.requested_stage,
                    error = %err.kind(),
                    "Transition rejected: {}",
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Move `entity` to `to`, returning the updated entity with its
    /// progress recomputed for the new stage.
    ///
    /// The entity's own stage is the caller's view; a caller holding an old
    /// copy gets `StaleState`.
    pub fn attempt_transition(
        &self,
        entity: &ProcessEntity,
        to: &StageId,
        actor: ActorId,
        reason: Option<&str>,
        checklist: &ChecklistStatus,
    ) -> LifecycleResult<ProcessEntity> {
        let mut request = TransitionRequest::for_entity(entity, to.as_str(), actor);
        if let Some(reason) = reason {
            request = request.with_reason(reason);
        }

        let event = self.attempt(&request, checklist)?;
        let mut updated = entity.clone();
        updated.apply(&event)?;
        updated.progress = Some(self.stage_progress(updated.kind, updated.stage())?);
        Ok(updated)
    }

    /// Like [`attempt_transition`](Self::attempt_transition), fetching the
    /// checklist for the entity's current stage from `source`.
    pub fn attempt_transition_with_source(
        &self,
        entity: &ProcessEntity,
        to: &StageId,
        actor: ActorId,
        reason: Option<&str>,
        source: &dyn ChecklistSource,
    ) -> LifecycleResult<ProcessEntity> {
        let checklist = if self.catalog(entity.kind)?.gate_for(entity.stage()).is_some() {
            source.checklist_status(entity.kind, entity.stage(), &entity.id)?
        } else {
            ChecklistStatus::new()
        };
        self.attempt_transition(entity, to, actor, reason, &checklist)
    }

    /// Receive every applied transition from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.applied.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Evaluate the gate on `stage` without attempting anything
    pub fn check_gate(
        &self,
        kind: EntityKind,
        stage: &StageId,
        checklist: &ChecklistStatus,
    ) -> LifecycleResult<GateEvaluation> {
        let catalog = self.catalog(kind)?;
        catalog.require_stage(stage)?;
        Ok(self.gates.evaluate(catalog, stage, checklist))
    }

    /// Legal next stages for `entity`, each with the gate outcome for
    /// leaving its current stage
    pub fn available_transitions(
        &self,
        entity: &ProcessEntity,
        checklist: &ChecklistStatus,
    ) -> LifecycleResult<Vec<AvailableTransition>> {
        let catalog = self.catalog(entity.kind)?;
        let gate = self.check_gate(entity.kind, entity.stage(), checklist)?;
        Ok(catalog
            .transitions_from(entity.stage())
            .iter()
            .map(|to| AvailableTransition {
                to: to.clone(),
                gate: gate.clone(),
            })
            .collect())
    }

    /// Full audit trail for an entity, oldest first
    pub fn history(
        &self,
        kind: EntityKind,
        entity_id: &EntityId,
    ) -> LifecycleResult<Vec<TransitionEvent>> {
        Ok(self.history.events_for(&EntityKey::new(kind, entity_id.clone()))?)
    }

    /// Refused attempts for an entity, oldest first
    pub fn rejected_for(
        &self,
        kind: EntityKind,
        entity_id: &EntityId,
    ) -> LifecycleResult<Vec<TransitionEvent>> {
        Ok(self
            .history
            .rejected_for(&EntityKey::new(kind, entity_id.clone()))?)
    }

    pub fn stage_progress(&self, kind: EntityKind, stage: &StageId) -> LifecycleResult<u8> {
        Ok(self.progress.stage_progress(self.catalog(kind)?, stage)?)
    }

    pub fn plan_progress(&self, plan: &Plan) -> u8 {
        self.progress.plan_progress(plan)
    }

    pub fn progress(&self) -> &ProgressCalculator {
        &self.progress
    }

    // ── Timeline ─────────────────────────────────────────────────────

    pub fn layout(&self, plan: &Plan) -> TimelineLayout {
        self.timeline.layout(plan)
    }

    pub fn layout_at(&self, plan: &Plan, now: DateTime<Utc>) -> TimelineLayout {
        self.timeline.layout_at(plan, now)
    }
}

impl std::fmt::Debug for LifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleService")
            .field("catalogs", &self.catalogs)
            .field("locks", &self.locks.len())
            .field("subscribers", &self.applied.receiver_count())
            .finish()
    }
}
