//! Catalog registry: one validated stage catalog per entity kind
//!
//! The registry is built once from configuration and is read-only afterwards;
//! share it as `Arc<CatalogRegistry>`.

use crate::catalog::StageCatalog;
use crate::config::LifecycleConfig;
use lifecycle_types::{
    CatalogError, CatalogResult, EntityId, EntityKind, LifecycleResult, ProcessEntity, Stage,
    StageId,
};
use std::collections::HashMap;

/// Validated catalogs keyed by entity kind
#[derive(Clone, Debug)]
pub struct CatalogRegistry {
    catalogs: HashMap<EntityKind, StageCatalog>,
}

impl CatalogRegistry {
    /// Build every configured catalog. Each entity kind needs exactly one.
    pub fn from_config(config: &LifecycleConfig) -> CatalogResult<Self> {
        let mut catalogs = HashMap::new();
        for entry in &config.catalogs {
            let catalog = StageCatalog::from_config(entry)?;
            if catalogs.insert(entry.kind, catalog).is_some() {
                return Err(CatalogError::DuplicateCatalog(entry.kind));
            }
        }

        for kind in EntityKind::ALL {
            let catalog = catalogs.get(&kind).ok_or(CatalogError::MissingCatalog(kind))?;
            tracing::info!(
                kind = %kind,
                stages = catalog.stage_count(),
                initial = %catalog.initial_stage(),
                "Stage catalog registered"
            );
        }

        Ok(Self { catalogs })
    }

    /// Registry over the built-in catalogs
    pub fn builtin() -> LifecycleResult<Self> {
        let config = LifecycleConfig::builtin()?;
        Ok(Self::from_config(&config)?)
    }

    pub fn catalog(&self, kind: EntityKind) -> CatalogResult<&StageCatalog> {
        self.catalogs
            .get(&kind)
            .ok_or(CatalogError::MissingCatalog(kind))
    }

    /// Ordered stages of `kind`
    pub fn stages_for(&self, kind: EntityKind) -> CatalogResult<&[Stage]> {
        Ok(self.catalog(kind)?.stages())
    }

    /// Legal targets from `from`. Unknown stages fail with `UnknownStage`.
    pub fn transitions_from(&self, kind: EntityKind, from: &StageId) -> CatalogResult<&[StageId]> {
        let catalog = self.catalog(kind)?;
        catalog.require_stage(from)?;
        Ok(catalog.transitions_from(from))
    }

    /// A new entity of `kind`, in that catalog's initial stage
    pub fn create_entity(&self, kind: EntityKind, id: EntityId) -> CatalogResult<ProcessEntity> {
        let catalog = self.catalog(kind)?;
        Ok(ProcessEntity::new(id, kind, catalog.initial_stage().clone()))
    }

    /// Catalogs sorted by kind
    pub fn iter(&self) -> impl Iterator<Item = &StageCatalog> {
        EntityKind::ALL
            .into_iter()
            .filter_map(|kind| self.catalogs.get(&kind))
    }
}
