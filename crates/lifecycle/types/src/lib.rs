//! Lifecycle Domain Types
//!
//! Contracts, sales leads and execution plans all move through an ordered
//! set of named stages. This crate holds the value types shared by the
//! lifecycle engine, the timeline layout and any persistence layer.
//!
//! # Key Concepts
//!
//! - **EntityKind**: a domain of process entities sharing one stage catalog.
//! - **Stage**: a named point in an entity's lifecycle, optionally gated by
//!   a checklist that must be complete before the entity may leave it.
//! - **TransitionRule**: a directed edge between two stages of one catalog.
//! - **ProcessEntity**: the thing moving through stages. Its stage only
//!   changes by applying an applied [`TransitionEvent`].
//! - **ChecklistStatus**: externally supplied completion state for the
//!   checklist items of a gated stage.
//! - **TransitionEvent**: immutable audit record of an attempted transition,
//!   applied or rejected.
//! - **Plan**: a dated container of milestones and tasks used for progress
//!   and timeline computation.
//!
//! # Design Principles
//!
//! 1. Stage names are scoped by entity kind. A contract stage is never a
//!    lead stage, even when the names collide.
//! 2. Every transition attempt leaves an audit record.
//! 3. Types here carry no behaviour beyond construction and invariants on
//!    their own fields.

#![deny(unsafe_code)]

mod checklist;
mod entity;
mod errors;
mod event;
mod plan;
mod stage;

pub use checklist::*;
pub use entity::*;
pub use errors::*;
pub use event::*;
pub use plan::*;
pub use stage::*;
