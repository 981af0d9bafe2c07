//! Stages and transition rules
//!
//! A stage is an immutable point in one entity kind's ordered flow. The
//! catalog for a kind is the full list of its stages plus every legal
//! directed edge between them.

use serde::{Deserialize, Serialize};

/// Identifier of a stage within one catalog (e.g. `PROPOSAL`, `ACTIVE`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(pub String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Checklist requirement attached to a stage.
///
/// An entity may only leave a gated stage once every required item is
/// complete. An empty requirement list passes trivially.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDefinition {
    /// Checklist item identifiers that must all be complete
    pub required_items: Vec<String>,
}

impl GateDefinition {
    pub fn new<I, S>(required_items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_items: required_items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required_count(&self) -> usize {
        self.required_items.len()
    }
}

/// A named point in a catalog's ordered flow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage identifier, unique within its catalog
    pub id: StageId,
    /// Zero-based position in the catalog's display order
    pub ordinal: usize,
    /// Terminal stages have no outgoing transitions
    pub terminal: bool,
    /// Checklist that must be complete before leaving this stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateDefinition>,
}

impl Stage {
    pub fn new(id: impl Into<String>, ordinal: usize) -> Self {
        Self {
            id: StageId::new(id),
            ordinal,
            terminal: false,
            gate: None,
        }
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn with_gate(mut self, gate: GateDefinition) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn is_gated(&self) -> bool {
        self.gate.is_some()
    }
}

/// A directed edge `from -> to` within one catalog
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionRule {
    pub from: StageId,
    pub to: StageId,
}

impl TransitionRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: StageId::new(from),
            to: StageId::new(to),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
