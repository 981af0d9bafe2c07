//! Lifecycle Engine
//!
//! Moves contracts, leads and execution plans through their stage catalogs.
//! Every attempt is checked against the catalog's legal edges and the gate
//! on the stage being left, and every attempt leaves exactly one audit event.
//!
//! # Key Principle
//!
//! **The history store decides the current stage.** A caller holding an
//! out-of-date copy of an entity is refused with `StaleState` instead of
//! silently overwriting a concurrent move.
//!
//! # Architecture
//!
//! The [`LifecycleService`] composes specialized components:
//!
//! - [`CatalogRegistry`]: One validated [`StageCatalog`] per entity kind
//! - [`TransitionEngine`]: Pure check of one request against a catalog
//! - [`GateEvaluator`]: Checklist requirement on gated stages
//! - [`HistoryStore`]: Append-only transition audit log
//! - [`EntityLocks`]: Serializes attempts on the same entity
//! - [`ProgressCalculator`]: Stage, plan, milestone and work-item progress
//!
//! # Example
//!
//! ```rust
//! use lifecycle_engine::{LifecycleConfig, LifecycleService};
//! use lifecycle_types::*;
//!
//! let config = LifecycleConfig::builtin().unwrap();
//! let service = LifecycleService::from_config(&config).unwrap();
//!
//! let lead = service
//!     .create_entity(EntityKind::Lead, EntityId::new("lead-7"))
//!     .unwrap();
//! let lead = service
//!     .attempt_transition(
//!         &lead,
//!         &StageId::new("CONTACTED"),
//!         ActorId::new("sales-1"),
//!         Some("intro call booked"),
//!         &ChecklistStatus::new(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(lead.stage(), &StageId::new("CONTACTED"));
//! assert_eq!(service.history(EntityKind::Lead, &lead.id).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod gate_evaluator;
pub mod history;
pub mod locks;
pub mod progress;
pub mod registry;
pub mod service;
pub mod transition_engine;

// Re-export main types
pub use catalog::StageCatalog;
pub use config::{CatalogConfig, LifecycleConfig, StageConfig, TransitionConfig};
pub use gate_evaluator::{GateEvaluation, GateEvaluator};
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use locks::EntityLocks;
pub use progress::ProgressCalculator;
pub use registry::CatalogRegistry;
pub use service::{AvailableTransition, ChecklistSource, LifecycleService};
pub use transition_engine::{TransitionAttempt, TransitionEngine};
