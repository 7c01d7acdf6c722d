//! Execution planner - compares configuration with tracked state

use crate::diff::{DiffSummary, attribute_changes};
use crate::error::Result;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Address of a managed object: resource type plus configuration label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    /// Resource type name
    pub type_name: String,
    /// Label chosen in configuration
    pub label: String,
}

impl Address {
    /// Create an address
    pub fn new(type_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            label: label.into(),
        }
    }

    /// Parse `type.label`
    pub fn parse(address: &str) -> Option<Self> {
        let (type_name, label) = address.split_once('.')?;
        if type_name.is_empty() || label.is_empty() {
            return None;
        }
        Some(Self::new(type_name, label))
    }

    /// Whether this address is selected by a `type` or `type.label` target
    pub fn matches(&self, target: &str) -> bool {
        let (type_name, label) = parse_target(target);
        matches_filter(self, type_name, label)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.label)
    }
}

/// What the executor will do with an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Tracked state matches configuration
    NoChange,
    /// Not tracked yet
    Create,
    /// Changed attributes can be applied to the same object
    Update,
    /// An identifying attribute changed
    Replace,
    /// Tracked but no longer configured
    Delete,
}

impl Action {
    /// Plan output marker
    pub fn symbol(self) -> &'static str {
        match self {
            Self::NoChange => " ",
            Self::Create => "+",
            Self::Update => "~",
            Self::Replace => "-/+",
            Self::Delete => "-",
        }
    }

    /// Verb used in messages
    pub fn verb(self) -> &'static str {
        match self {
            Self::NoChange => "keep",
            Self::Create => "create",
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Delete => "delete",
        }
    }
}

/// One planned change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedChange {
    /// Object address
    pub address: Address,
    /// What to do
    pub action: Action,
    /// Tracked attributes
    pub prior: Option<Value>,
    /// Configured attributes, normalized
    pub planned: Option<Value>,
    /// Attributes forcing a replacement
    pub replace_because: Vec<String>,
}

/// Ordered set of planned changes
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    changes: Vec<PlannedChange>,
}

impl Plan {
    /// Compare configuration with tracked state
    ///
    /// Both maps are keyed by address. Configured values are normalized
    /// through their resource type first, so defaults never show up as
    /// changes.
    pub fn build(
        registry: &Registry,
        desired: &BTreeMap<Address, Value>,
        current: &BTreeMap<Address, Value>,
    ) -> Result<Self> {
        let mut changes = Vec::with_capacity(desired.len());

        for (address, config) in desired {
            let handler = registry.get(&address.type_name)?;
            let planned = handler.normalize(config)?;
            let prior = current.get(address);

            let (action, replace_because) = match prior {
                None => (Action::Create, Vec::new()),
                Some(prior) => {
                    let changed = attribute_changes(Some(prior), Some(&planned));
                    if changed.is_empty() {
                        (Action::NoChange, Vec::new())
                    } else {
                        let forcing = handler.schema().requires_replace();
                        let because: Vec<String> = changed
                            .into_iter()
                            .filter(|c| forcing.contains(&c.name.as_str()))
                            .map(|c| c.name)
                            .collect();
                        if because.is_empty() {
                            (Action::Update, because)
                        } else {
                            (Action::Replace, because)
                        }
                    }
                }
            };

            changes.push(PlannedChange {
                address: address.clone(),
                action,
                prior: prior.cloned(),
                planned: Some(planned),
                replace_because,
            });
        }

        for (address, prior) in current {
            if !desired.contains_key(address) {
                changes.push(PlannedChange {
                    address: address.clone(),
                    action: Action::Delete,
                    prior: Some(prior.clone()),
                    planned: None,
                    replace_because: Vec::new(),
                });
            }
        }

        changes.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(Self { changes })
    }

    /// Plan deleting every tracked object
    pub fn destroy(current: &BTreeMap<Address, Value>) -> Self {
        let changes = current
            .iter()
            .map(|(address, prior)| PlannedChange {
                address: address.clone(),
                action: Action::Delete,
                prior: Some(prior.clone()),
                planned: None,
                replace_because: Vec::new(),
            })
            .collect();
        Self { changes }
    }

    /// Every change, including no-ops, sorted by address
    pub fn changes(&self) -> &[PlannedChange] {
        &self.changes
    }

    /// Consume the plan
    pub fn into_changes(self) -> Vec<PlannedChange> {
        self.changes
    }

    /// Changes that touch the device
    pub fn actionable(&self) -> impl Iterator<Item = &PlannedChange> {
        self.changes.iter().filter(|c| c.action != Action::NoChange)
    }

    /// Check if any change touches the device
    pub fn has_changes(&self) -> bool {
        self.actionable().next().is_some()
    }

    /// Counts per action
    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_changes(&self.changes)
    }

    /// Filter plan to only include changes matching a predicate
    #[must_use]
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlannedChange) -> bool,
    {
        Self {
            changes: self.changes.into_iter().filter(|c| predicate(c)).collect(),
        }
    }

    /// Filter plan to only include changes matching a target pattern
    ///
    /// Target format: "type" or "type.label". A type matches by prefix, so
    /// `junos_security` selects every security resource.
    #[must_use]
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                self.filter(|c| c.address.matches(t))
            }
        }
    }
}

/// Parse a target string like "type.label" into (type, label)
fn parse_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('.') {
        Some((type_name, label)) => (type_name, Some(label)),
        None => (target, None),
    }
}

/// Check if an address matches the filter criteria
fn matches_filter(address: &Address, type_name: &str, label: Option<&str>) -> bool {
    if !address.type_name.starts_with(type_name) {
        return false;
    }
    label.is_none_or(|l| address.label == l)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::Thing;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::new().with::<Thing>()
    }

    fn addr(label: &str) -> Address {
        Address::new("test_thing", label)
    }

    #[test]
    fn test_address_matches() {
        let address = Address::new("junos_security_policy", "lan_wan");
        assert!(address.matches("junos_security"));
        assert!(address.matches("junos_security_policy.lan_wan"));
        assert!(!address.matches("junos_security_policy.other"));
        assert!(!address.matches("junos_application"));
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("junos_application"), ("junos_application", None));
        assert_eq!(
            parse_target("junos_application.web"),
            ("junos_application", Some("web"))
        );
        assert_eq!(parse_target("a.b.c"), ("a", Some("b.c")));
    }

    #[test]
    fn test_address_roundtrip() {
        let address = Address::parse("junos_application.web").unwrap();
        assert_eq!(address, Address::new("junos_application", "web"));
        assert_eq!(address.to_string(), "junos_application.web");
        assert!(Address::parse("junos_application").is_none());
        assert!(Address::parse(".web").is_none());
    }

    #[test]
    fn test_build_actions() {
        let desired = BTreeMap::from([
            (addr("new"), json!({"name": "n", "value": "1"})),
            (addr("same"), json!({"name": "s", "value": "1"})),
            (addr("changed"), json!({"name": "c", "value": "2"})),
            (addr("renamed"), json!({"name": "r2", "value": "1"})),
        ]);
        let current = BTreeMap::from([
            (addr("same"), json!({"name": "s", "value": "1"})),
            (addr("changed"), json!({"name": "c", "value": "1"})),
            (addr("renamed"), json!({"name": "r1", "value": "1"})),
            (addr("gone"), json!({"name": "g", "value": "1"})),
        ]);

        let plan = Plan::build(&registry(), &desired, &current).unwrap();
        let actions: Vec<_> = plan
            .changes()
            .iter()
            .map(|c| (c.address.label.as_str(), c.action))
            .collect();
        assert_eq!(
            actions,
            vec![
                ("changed", Action::Update),
                ("gone", Action::Delete),
                ("new", Action::Create),
                ("renamed", Action::Replace),
                ("same", Action::NoChange),
            ]
        );
        let renamed = &plan.changes()[3];
        assert_eq!(renamed.replace_because, vec!["name".to_string()]);

        let summary = plan.summary();
        assert_eq!(summary.total(), 4);
        assert_eq!(plan.actionable().count(), 4);
    }

    #[test]
    fn test_unknown_type_fails() {
        let desired = BTreeMap::from([(Address::new("nope", "x"), json!({}))]);
        assert!(Plan::build(&registry(), &desired, &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_destroy_and_filter() {
        let current = BTreeMap::from([
            (addr("a"), json!({"name": "a", "value": "1"})),
            (addr("b"), json!({"name": "b", "value": "1"})),
            (Address::new("other_thing", "c"), json!({})),
        ]);
        let plan = Plan::destroy(&current);
        assert_eq!(plan.changes().len(), 3);
        assert!(plan.changes().iter().all(|c| c.action == Action::Delete));

        let filtered = plan.clone().filter_by_target(Some("test_thing.b"));
        assert_eq!(filtered.changes().len(), 1);
        assert_eq!(filtered.changes()[0].address.label, "b");

        let by_type = plan.filter_by_target(Some("test"));
        assert_eq!(by_type.changes().len(), 2);
    }
}
