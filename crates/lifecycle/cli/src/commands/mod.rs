//! CLI command implementations

pub mod catalog;
pub mod gate;
pub mod plan;
pub mod simulate;
