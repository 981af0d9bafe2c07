//! Stage catalog: the ordered stages and legal edges of one entity kind
//!
//! A catalog is immutable once built. Building it validates the graph, so a
//! catalog that exists is always well formed: every stage reachable from the
//! initial stage can reach a terminal stage, and terminal stages have no
//! outgoing edges.

use crate::config::CatalogConfig;
use lifecycle_types::{
    CatalogError, CatalogResult, EntityKind, GateDefinition, Stage, StageId, TransitionRule,
};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Stages and transition rules for one entity kind
#[derive(Clone, Debug)]
pub struct StageCatalog {
    kind: EntityKind,
    initial: StageId,
    /// Stages in ordinal order
    stages: Vec<Stage>,
    /// Adjacency: stage → legal targets, in configuration order
    edges: HashMap<StageId, Vec<StageId>>,
}

impl StageCatalog {
    /// Build and validate a catalog.
    ///
    /// Stage ordinals are reassigned from list position.
    pub fn new(
        kind: EntityKind,
        initial: StageId,
        stages: Vec<Stage>,
        transitions: Vec<TransitionRule>,
    ) -> CatalogResult<Self> {
        let stages: Vec<Stage> = stages
            .into_iter()
            .enumerate()
            .map(|(ordinal, stage)| Stage { ordinal, ..stage })
            .collect();

        let mut edges: HashMap<StageId, Vec<StageId>> = HashMap::new();
        for rule in transitions {
            let targets = edges.entry(rule.from.clone()).or_default();
            if targets.contains(&rule.to) {
                return Err(CatalogError::DuplicateTransition {
                    kind,
                    from: rule.from,
                    to: rule.to,
                });
            }
            targets.push(rule.to);
        }

        let catalog = Self {
            kind,
            initial,
            stages,
            edges,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from its configuration entry
    pub fn from_config(config: &CatalogConfig) -> CatalogResult<Self> {
        let kind = config.kind;
        let first = config.stages.first().ok_or(CatalogError::Empty(kind))?;
        let initial = StageId::new(config.initial.as_deref().unwrap_or(first.id.as_str()));

        let stages = config
            .stages
            .iter()
            .enumerate()
            .map(|(ordinal, s)| {
                let mut stage = Stage::new(s.id.as_str(), ordinal);
                stage.terminal = s.terminal;
                if let Some(items) = &s.gate {
                    stage = stage.with_gate(GateDefinition::new(items.iter().cloned()));
                }
                stage
            })
            .collect();

        let transitions = config
            .transitions
            .iter()
            .flat_map(|t| {
                t.to
                    .iter()
                    .map(move |to| TransitionRule::new(t.from.as_str(), to.as_str()))
            })
            .collect();

        Self::new(kind, initial, stages, transitions)
    }

    /// Check the catalog graph.
    pub fn validate(&self) -> CatalogResult<()> {
        let kind = self.kind;
        if self.stages.is_empty() {
            return Err(CatalogError::Empty(kind));
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if !seen.insert(&stage.id) {
                return Err(CatalogError::DuplicateStage {
                    kind,
                    stage: stage.id.clone(),
                });
            }
        }

        if !self.contains(&self.initial) {
            return Err(CatalogError::UnknownStage {
                kind,
                stage: self.initial.clone(),
            });
        }

        for (from, targets) in &self.edges {
            if !self.contains(from) {
                return Err(CatalogError::UnknownStage {
                    kind,
                    stage: from.clone(),
                });
            }
            if let Some(to) = targets.iter().find(|t| !self.contains(t)) {
                return Err(CatalogError::UnknownStage {
                    kind,
                    stage: to.clone(),
                });
            }
        }

        for stage in &self.stages {
            let outgoing = self.edges.get(&stage.id).map_or(0, Vec::len);
            match (stage.terminal, outgoing) {
                (true, n) if n > 0 => {
                    return Err(CatalogError::TerminalHasTransitions {
                        kind,
                        stage: stage.id.clone(),
                    })
                }
                (false, 0) => {
                    return Err(CatalogError::DeadEnd {
                        kind,
                        stage: stage.id.clone(),
                    })
                }
                _ => {}
            }
            if let Some(gate) = &stage.gate {
                let mut items = HashSet::new();
                if let Some(dup) = gate.required_items.iter().find(|i| !items.insert(*i)) {
                    return Err(CatalogError::Validation(format!(
                        "gate on {} lists {} twice",
                        stage.id, dup
                    )));
                }
            }
        }

        // Every stage on a path from the initial stage must be able to finish.
        for stage_id in self.reachable_from(&self.initial) {
            let descendants = self.reachable_from(&stage_id);
            let finishes = descendants.iter().any(|s| self.is_terminal(s));
            if !finishes {
                return Err(CatalogError::NoReachableTerminal {
                    kind,
                    stage: stage_id,
                });
            }
        }

        Ok(())
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn initial_stage(&self) -> &StageId {
        &self.initial
    }

    /// Stages in ordinal order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.id == id)
    }

    /// Look up a stage, failing with `UnknownStage`
    pub fn require_stage(&self, id: &StageId) -> CatalogResult<&Stage> {
        self.stage(id).ok_or_else(|| CatalogError::UnknownStage {
            kind: self.kind,
            stage: id.clone(),
        })
    }

    pub fn contains(&self, id: &StageId) -> bool {
        self.stage(id).is_some()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Legal targets from `from`, in configuration order.
    /// Unknown stages and terminal stages have none.
    pub fn transitions_from(&self, from: &StageId) -> &[StageId] {
        self.edges.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `from -> to` is an edge of this catalog
    pub fn allows(&self, from: &StageId, to: &StageId) -> bool {
        self.transitions_from(from).contains(to)
    }

    /// Every edge, grouped by source stage in ordinal order
    pub fn transitions(&self) -> Vec<TransitionRule> {
        self.stages
            .iter()
            .flat_map(|s| {
                self.transitions_from(&s.id).iter().map(|to| TransitionRule {
                    from: s.id.clone(),
                    to: to.clone(),
                })
            })
            .collect()
    }

    pub fn is_terminal(&self, id: &StageId) -> bool {
        self.stage(id).is_some_and(|s| s.terminal)
    }

    pub fn terminal_stages(&self) -> Vec<&Stage> {
        self.stages.iter().filter(|s| s.terminal).collect()
    }

    pub fn gate_for(&self, id: &StageId) -> Option<&GateDefinition> {
        self.stage(id).and_then(|s| s.gate.as_ref())
    }

    /// All stages reachable from `start`, including `start` itself
    pub fn reachable_from(&self, start: &StageId) -> BTreeSet<StageId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for next in self.transitions_from(&current) {
                if !visited.contains(next) {
                    queue.push_back(next.clone());
                }
            }
        }

        visited
    }
}
