use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{Address, Outcome, Registry, StateChange};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const STATE_VERSION: u32 = 1;

// ============================================================================
// State Structures
// ============================================================================

/// Objects junosform manages, as last seen on the device
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct State {
    /// Format version
    pub version: u32,

    /// Bumped on every save
    pub serial: u64,

    /// Last time the state was saved
    pub last_updated: DateTime<Utc>,

    /// Tracked objects keyed by `type.label`
    #[serde(default)]
    pub resources: BTreeMap<String, TrackedResource>,
}

/// One tracked object
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrackedResource {
    /// Resource type name
    #[serde(rename = "type")]
    pub type_name: String,

    /// Device identity, e.g. `app1` or `trust:untrust`
    pub identity: String,

    /// Attributes as last applied or read
    pub attributes: Value,

    /// Last time this entry changed
    pub updated: DateTime<Utc>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            last_updated: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

// ============================================================================
// State Implementation
// ============================================================================

impl State {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!(
            "Loaded state serial {} ({} resources) from {}",
            state.serial,
            state.resources.len(),
            path.display()
        );
        Ok(state)
    }

    /// Bump the serial and save to disk
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.serial += 1;
        self.last_updated = Utc::now();
        let content =
            serde_json::to_string_pretty(&self).context("Failed to serialize state to JSON")?;

        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state serial {} to {}", self.serial, path.display());
        Ok(())
    }

    /// Tracked attributes by address, as the planner wants them
    pub fn current(&self) -> BTreeMap<Address, Value> {
        self.resources
            .iter()
            .filter_map(|(key, tracked)| {
                let address = Address::parse(key);
                if address.is_none() {
                    log::warn!("Ignoring malformed state entry {key:?}");
                }
                address.map(|a| (a, tracked.attributes.clone()))
            })
            .collect()
    }

    /// Look up a tracked object
    pub fn get(&self, address: &Address) -> Option<&TrackedResource> {
        self.resources.get(&address.to_string())
    }

    /// Track `attributes` under `address`
    pub fn track(&mut self, registry: &Registry, address: &Address, attributes: Value) -> Result<()> {
        let identity = registry
            .get(&address.type_name)?
            .identity(&attributes)?
            .to_string();
        self.resources.insert(
            address.to_string(),
            TrackedResource {
                type_name: address.type_name.clone(),
                identity,
                attributes,
                updated: Utc::now(),
            },
        );
        Ok(())
    }

    /// Stop tracking `address`
    pub fn forget(&mut self, address: &Address) -> Option<TrackedResource> {
        self.resources.remove(&address.to_string())
    }

    /// Record what an executed change did
    pub fn record(&mut self, registry: &Registry, outcome: &Outcome) -> Result<()> {
        match &outcome.state {
            StateChange::Keep => {}
            StateChange::Set(attributes) => {
                self.track(registry, &outcome.address, attributes.clone())?;
            }
            StateChange::Remove => {
                self.forget(&outcome.address);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource;
    use declarative::ChangeResult;
    use serde_json::json;

    fn address() -> Address {
        Address::new("junos_application", "web")
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = State::load(&dir.path().join("state.json")).unwrap();
        assert_eq!(state.serial, 0);
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_save_bumps_serial_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let registry = resource::registry();

        let mut state = State::default();
        state
            .track(&registry, &address(), json!({ "name": "app1", "protocol": "tcp" }))
            .unwrap();
        state.save(&path).unwrap();
        state.save(&path).unwrap();

        let loaded = State::load(&path).unwrap();
        assert_eq!(loaded.serial, 2);
        let tracked = loaded.get(&address()).unwrap();
        assert_eq!(tracked.type_name, "junos_application");
        assert_eq!(tracked.identity, "app1");

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"type\": \"junos_application\""));
    }

    #[test]
    fn test_record_outcomes() {
        let registry = resource::registry();
        let mut state = State::default();
        let policy = Address::new("junos_security_policy", "lan_wan");
        state
            .record(
                &registry,
                &Outcome {
                    address: policy.clone(),
                    result: ChangeResult::Created,
                    state: StateChange::Set(json!({
                        "from_zone": "trust",
                        "to_zone": "untrust",
                        "policy": [],
                    })),
                },
            )
            .unwrap();
        assert_eq!(state.get(&policy).unwrap().identity, "trust:untrust");
        assert_eq!(state.current().len(), 1);

        state
            .record(
                &registry,
                &Outcome {
                    address: policy.clone(),
                    result: ChangeResult::Failed {
                        error: "x".to_string(),
                    },
                    state: StateChange::Keep,
                },
            )
            .unwrap();
        assert!(state.get(&policy).is_some());

        state
            .record(
                &registry,
                &Outcome {
                    address: policy.clone(),
                    result: ChangeResult::Deleted,
                    state: StateChange::Remove,
                },
            )
            .unwrap();
        assert!(state.current().is_empty());
    }

    #[test]
    fn test_current_skips_malformed_keys() {
        let mut state = State::default();
        state.resources.insert(
            "nodot".to_string(),
            TrackedResource {
                type_name: "junos_application".to_string(),
                identity: "x".to_string(),
                attributes: json!({}),
                updated: Utc::now(),
            },
        );
        assert!(state.current().is_empty());
    }
}
