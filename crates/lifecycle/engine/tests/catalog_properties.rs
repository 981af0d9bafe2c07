//! Property tests over stage catalogs

use lifecycle_engine::{
    CatalogRegistry, LifecycleConfig, LifecycleService, ProgressCalculator, StageCatalog,
};
use lifecycle_types::*;
use proptest::prelude::*;

fn registry() -> CatalogRegistry {
    CatalogRegistry::builtin().unwrap()
}

/// Random graphs over `n` stages: terminal flags plus an edge list
fn arb_graph() -> impl Strategy<Value = (Vec<bool>, Vec<(usize, usize)>)> {
    (2usize..7).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec((0..n, 0..n), 0..(n * 2)),
        )
    })
}

proptest! {
    /// A catalog either fails validation or lets every reachable stage finish.
    #[test]
    fn property_valid_catalogs_always_terminate((terminal, edges) in arb_graph()) {
        let stages: Vec<Stage> = terminal
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let stage = Stage::new(format!("S{i}"), i);
                if *t { stage.terminal() } else { stage }
            })
            .collect();
        let mut rules: Vec<TransitionRule> = Vec::new();
        for (from, to) in &edges {
            let rule = TransitionRule::new(format!("S{from}"), format!("S{to}"));
            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }

        if let Ok(catalog) = StageCatalog::new(EntityKind::Lead, StageId::new("S0"), stages, rules) {
            for stage in catalog.reachable_from(catalog.initial_stage()) {
                let finishes = catalog
                    .reachable_from(&stage)
                    .iter()
                    .any(|s| catalog.is_terminal(s));
                prop_assert!(finishes, "stage {} cannot finish", stage);
                prop_assert_eq!(catalog.is_terminal(&stage), catalog.transitions_from(&stage).is_empty());
            }
        }
    }

    /// Walking legal edges at random from the initial stage never gets stuck
    /// short of a terminal stage.
    #[test]
    fn property_random_walk_never_dead_ends(kind_idx in 0usize..3, picks in prop::collection::vec(any::<usize>(), 0..40)) {
        let registry = registry();
        let catalog = registry.catalog(EntityKind::ALL[kind_idx]).unwrap();
        let mut stage = catalog.initial_stage().clone();

        for pick in picks {
            let next = catalog.transitions_from(&stage);
            if next.is_empty() {
                prop_assert!(catalog.is_terminal(&stage));
                break;
            }
            stage = next[pick % next.len()].clone();
        }
        prop_assert!(catalog.contains(&stage));
    }

    /// Through the service, any pair of stages not joined by an edge is
    /// refused and leaves the entity where it was.
    #[test]
    fn property_illegal_pairs_rejected_end_to_end(kind_idx in 0usize..3, target in 0usize..8) {
        let kind = EntityKind::ALL[kind_idx];
        let service = LifecycleService::from_config(&LifecycleConfig::builtin().unwrap()).unwrap();
        let entity = service.create_entity(kind, EntityId::generate()).unwrap();
        let catalog = service.catalog(kind).unwrap();
        let to = catalog.stages()[target % catalog.stage_count()].id.clone();

        let result = service.attempt_transition(&entity, &to, ActorId::new("prop"), None, &ChecklistStatus::new());
        let legal = catalog.allows(entity.stage(), &to);

        prop_assert_eq!(result.is_ok(), legal);
        if !legal {
            prop_assert_eq!(
                service.current_stage(kind, &entity.id).unwrap(),
                entity.stage().clone()
            );
        }
        prop_assert_eq!(service.history(kind, &entity.id).unwrap().len(), 1);
    }
}

#[test]
fn every_builtin_stage_has_progress() {
    let registry = registry();
    for catalog in registry.iter() {
        let mut last = 0;
        for stage in catalog.stages() {
            let progress = ProgressCalculator::new()
                .stage_progress(catalog, &stage.id)
                .unwrap();
            assert!(progress > last, "{} did not advance progress", stage.id);
            last = progress;
        }
        assert_eq!(last, 100);
    }
}
