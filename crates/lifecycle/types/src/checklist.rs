//! Checklist completion state supplied by callers
//!
//! Checklist data comes from an external knowledge-base collaborator and is
//! passed in fresh on every gate check. Which items are *required* is decided
//! by the catalog's gate definition, never by the keys present here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Completion state of checklist items, keyed by item identifier
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistStatus {
    /// Item identifier → completed flag
    #[serde(default)]
    pub items: BTreeMap<String, bool>,
}

impl ChecklistStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a status where every listed item is complete
    pub fn completed<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(|i| (i.into(), true)).collect(),
        }
    }

    pub fn with_item(mut self, id: impl Into<String>, complete: bool) -> Self {
        self.items.insert(id.into(), complete);
        self
    }

    pub fn mark_complete(&mut self, id: impl Into<String>) {
        self.items.insert(id.into(), true);
    }

    pub fn mark_incomplete(&mut self, id: impl Into<String>) {
        self.items.insert(id.into(), false);
    }

    /// Unknown items count as incomplete
    pub fn is_complete(&self, id: &str) -> bool {
        self.items.get(id).copied().unwrap_or(false)
    }

    /// The set of completed item identifiers
    pub fn completed_set(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .filter(|(_, done)| **done)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.items.values().filter(|done| **done).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_item_is_incomplete() {
        let status = ChecklistStatus::new().with_item("agreement_reviewed", true);
        assert!(status.is_complete("agreement_reviewed"));
        assert!(!status.is_complete("signature_collected"));
    }

    #[test]
    fn test_mark_and_unmark() {
        let mut status = ChecklistStatus::completed(["a", "b"]);
        assert_eq!(status.completed_count(), 2);

        status.mark_incomplete("b");
        assert_eq!(status.completed_count(), 1);
        assert_eq!(status.completed_set().into_iter().collect::<Vec<_>>(), vec!["a"]);

        status.mark_complete("c");
        assert!(status.is_complete("c"));
    }

    #[test]
    fn test_deserialize_from_keyed_object() {
        let status: ChecklistStatus =
            serde_json::from_str(r#"{"items":{"agreement_reviewed":true,"signature_collected":false}}"#)
                .unwrap();
        assert_eq!(status.completed_count(), 1);
    }
}
