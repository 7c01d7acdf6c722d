//! Attribute-level diffs between tracked and planned state

use crate::planner::{Action, PlannedChange};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// One top-level attribute that differs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    /// Attribute name
    pub name: String,
    /// Tracked value, if any
    pub before: Option<Value>,
    /// Planned value, if any
    pub after: Option<Value>,
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Compare two attribute sets, treating null and missing as equal
///
/// Changes are returned sorted by attribute name.
pub fn attribute_changes(prior: Option<&Value>, planned: Option<&Value>) -> Vec<AttributeChange> {
    let empty = serde_json::Map::new();
    let before = prior.and_then(Value::as_object).unwrap_or(&empty);
    let after = planned.and_then(Value::as_object).unwrap_or(&empty);

    let names: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    names
        .into_iter()
        .filter_map(|name| {
            let b = present(before.get(name));
            let a = present(after.get(name));
            (b != a).then(|| AttributeChange {
                name: name.clone(),
                before: b.cloned(),
                after: a.cloned(),
            })
        })
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Objects to create
    pub additions: usize,
    /// Objects to delete
    pub removals: usize,
    /// Objects to update in place
    pub modifications: usize,
    /// Objects to delete and create again
    pub replacements: usize,
}

impl DiffSummary {
    /// Create a summary from planned changes
    pub fn from_changes(changes: &[PlannedChange]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            match change.action {
                Action::Create => summary.additions += 1,
                Action::Delete => summary.removals += 1,
                Action::Update => summary.modifications += 1,
                Action::Replace => summary.replacements += 1,
                Action::NoChange => {}
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications + self.replacements
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group changes by resource type
pub fn group_by_type(changes: &[PlannedChange]) -> BTreeMap<&str, Vec<&PlannedChange>> {
    let mut groups: BTreeMap<&str, Vec<&PlannedChange>> = BTreeMap::new();
    for change in changes {
        groups
            .entry(change.address.type_name.as_str())
            .or_default()
            .push(change);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_equals_missing() {
        let prior = json!({"name": "a", "description": null});
        let planned = json!({"name": "a"});
        assert!(attribute_changes(Some(&prior), Some(&planned)).is_empty());
    }

    #[test]
    fn test_changes_sorted() {
        let prior = json!({"name": "a", "protocol": "tcp", "uuid": "x"});
        let planned = json!({"name": "a", "protocol": "udp", "description": "d"});
        let changes = attribute_changes(Some(&prior), Some(&planned));
        let names: Vec<_> = changes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["description", "protocol", "uuid"]);
        assert_eq!(changes[1].before, Some(json!("tcp")));
        assert_eq!(changes[2].after, None);
    }

    #[test]
    fn test_creation_lists_every_attribute() {
        let planned = json!({"name": "a", "protocol": "tcp"});
        assert_eq!(attribute_changes(None, Some(&planned)).len(), 2);
    }
}
