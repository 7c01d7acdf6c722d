//! Everything a command needs: configuration, resource types, state and device.

use crate::config::Config;
use crate::resource;
use crate::state::State;
use anyhow::{Context, Result};
use declarative::{Address, Client, Registry};
use junos::MemoryDevice;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct Project {
    pub config: Config,
    pub registry: Registry,
    pub state: State,
    state_path: PathBuf,
}

impl Project {
    /// Load configuration and state.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)?;
        let state_path = config.state_path()?;
        let state = State::load(&state_path)?;
        Ok(Self {
            config,
            registry: resource::registry(),
            state,
            state_path,
        })
    }

    /// Client for the configured device.
    pub fn client(&self) -> Result<Client> {
        let path = self.config.device_path();
        let device = MemoryDevice::open_file(&path)
            .with_context(|| format!("Failed to open device {}", path.display()))?
            .lock_timeout(self.config.lock_timeout());
        log::info!("Using device {}", path.display());
        Ok(Client::new(Box::new(device), self.config.client_options()))
    }

    /// Configured resources, restricted to `target` (`type` or `type.label`).
    pub fn desired(&self, target: Option<&str>) -> Result<BTreeMap<Address, Value>> {
        let mut desired = self.config.desired()?;
        if let Some(target) = target {
            desired.retain(|address, _| address.matches(target));
        }
        Ok(desired)
    }

    /// Tracked resources, restricted to `target`.
    pub fn current(&self, target: Option<&str>) -> BTreeMap<Address, Value> {
        let mut current = self.state.current();
        if let Some(target) = target {
            current.retain(|address, _| address.matches(target));
        }
        current
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn save_state(&mut self) -> Result<()> {
        self.state.save(&self.state_path)
    }
}

/// Parse a `type.label` argument.
pub fn parse_address(address: &str) -> Result<Address> {
    Address::parse(address)
        .with_context(|| format!("Invalid address {address:?}, expected <type>.<label>"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;

    pub fn write_project(dir: &Path, resources: &str) -> PathBuf {
        let config = dir.join("junosform.toml");
        fs::write(
            &config,
            format!(
                "[provider]\ndevice = \"router.set\"\nstate = \"state.json\"\nlock_timeout_secs = 1\n\n{resources}"
            ),
        )
        .unwrap();
        config
    }

    #[test]
    fn test_load_and_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(
            dir.path(),
            "[resources.junos_application.web]\nname = \"web\"\nprotocol = \"tcp\"\n\n\
             [resources.junos_application_set.all]\nname = \"all\"\napplications = [\"web\"]\n",
        );
        let project = Project::load(&path).unwrap();
        assert_eq!(project.state_path(), dir.path().join("state.json"));
        assert_eq!(project.desired(None).unwrap().len(), 2);
        assert_eq!(project.desired(Some("junos_application_set")).unwrap().len(), 1);
        // a type prefix selects both types
        assert_eq!(project.desired(Some("junos_application")).unwrap().len(), 2);
        assert!(project.client().is_ok());
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("junos_application.web").is_ok());
        assert!(parse_address("junos_application").is_err());
    }
}
