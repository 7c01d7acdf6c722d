//! Configuration file
//!
//! ```toml
//! [provider]
//! device = "router.set"
//!
//! [resources.junos_application.web]
//! name = "app1"
//! protocol = "tcp"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use anyhow::{Context, Result};
use declarative::{Address, Options};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DEVICE: &str = "device.set";
const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 30;

/// Problems in the `[resources]` tables the TOML layer cannot catch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid label {label:?} for {type_name}: use letters, digits, '-' and '_'")]
    InvalidLabel { type_name: String, label: String },

    #[error("{address} must be a table of attributes")]
    NotATable { address: String },
}

/// Device and state settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// File-backed device configuration
    pub device: String,
    /// State file; defaults to the user state directory
    pub state: Option<String>,
    /// Seconds to wait for the configuration lock
    pub lock_timeout_secs: u64,
    /// Append create lines here instead of committing them
    pub fake_create_set_file: Option<String>,
    /// Divert update lines as well
    pub fake_update_also: bool,
    /// Divert delete lines as well
    pub fake_delete_also: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            state: None,
            lock_timeout_secs: DEFAULT_LOCK_TIMEOUT_SECS,
            fake_create_set_file: None,
            fake_update_also: false,
            fake_delete_also: false,
        }
    }
}

/// A parsed configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    /// `resources.<type>.<label>` attribute tables
    #[serde(default)]
    pub resources: BTreeMap<String, BTreeMap<String, Value>>,

    #[serde(skip)]
    dir: PathBuf,
}

impl Config {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let config = Self::parse(&content, dir)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration text, resolving relative paths against `dir`.
    pub fn parse(content: &str, dir: PathBuf) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.dir = dir;
        Ok(config)
    }

    /// Expand `~` and variables, then anchor relative paths at the config directory.
    fn resolve(&self, path: &str) -> PathBuf {
        let expanded = shellexpand::full(path).unwrap_or(Cow::Borrowed(path));
        let path = PathBuf::from(expanded.as_ref());
        if path.is_absolute() {
            path
        } else {
            self.dir.join(path)
        }
    }

    /// Device configuration file.
    pub fn device_path(&self) -> PathBuf {
        self.resolve(&self.provider.device)
    }

    /// State file, `~/.local/state/junosform/state.json` unless configured.
    pub fn state_path(&self) -> Result<PathBuf> {
        if let Some(state) = &self.provider.state {
            return Ok(self.resolve(state));
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home
            .join(".local")
            .join("state")
            .join("junosform")
            .join("state.json"))
    }

    /// How long to wait for the configuration lock.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.lock_timeout_secs)
    }

    /// Orchestrator options.
    pub fn client_options(&self) -> Options {
        Options {
            fake_create_set_file: self
                .provider
                .fake_create_set_file
                .as_deref()
                .map(|p| self.resolve(p)),
            fake_update_also: self.provider.fake_update_also,
            fake_delete_also: self.provider.fake_delete_also,
        }
    }

    /// Configured resources by address.
    pub fn desired(&self) -> Result<BTreeMap<Address, Value>> {
        let mut desired = BTreeMap::new();
        for (type_name, entries) in &self.resources {
            for (label, value) in entries {
                let valid = !label.is_empty()
                    && label
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                if !valid {
                    return Err(ConfigError::InvalidLabel {
                        type_name: type_name.clone(),
                        label: label.clone(),
                    }
                    .into());
                }
                let address = Address::new(type_name, label);
                if !value.is_object() {
                    return Err(ConfigError::NotATable {
                        address: address.to_string(),
                    }
                    .into());
                }
                desired.insert(address, value.clone());
            }
        }
        Ok(desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"
[provider]
device = "router.set"
state = "state/junosform.json"
lock_timeout_secs = 5
fake_create_set_file = "/tmp/pending.set"
fake_update_also = true

[resources.junos_application.web]
name = "app1"
protocol = "tcp"
destination_port = "80"

[resources.junos_security_policy.lan_wan]
from_zone = "trust"
to_zone = "untrust"

[[resources.junos_security_policy.lan_wan.policy]]
name = "allow-web"
match_source_address = ["any"]
match_destination_address = ["any"]
match_application = ["junos-http"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE, PathBuf::from("/etc/junosform")).unwrap();
        assert_eq!(config.device_path(), PathBuf::from("/etc/junosform/router.set"));
        assert_eq!(
            config.state_path().unwrap(),
            PathBuf::from("/etc/junosform/state/junosform.json")
        );
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));

        let options = config.client_options();
        assert_eq!(options.fake_create_set_file, Some(PathBuf::from("/tmp/pending.set")));
        assert!(options.fake_update_also);
        assert!(!options.fake_delete_also);
    }

    #[test]
    fn test_desired_addresses() {
        let config = Config::parse(SAMPLE, PathBuf::new()).unwrap();
        let desired = config.desired().unwrap();
        let addresses: Vec<String> = desired.keys().map(ToString::to_string).collect();
        assert_eq!(
            addresses,
            vec!["junos_application.web", "junos_security_policy.lan_wan"]
        );
        let policy = &desired[&Address::new("junos_security_policy", "lan_wan")];
        assert_eq!(policy["policy"][0]["match_application"], json!(["junos-http"]));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("", PathBuf::from("lab")).unwrap();
        assert_eq!(config.device_path(), PathBuf::from("lab/device.set"));
        assert_eq!(config.lock_timeout(), Duration::from_secs(30));
        assert!(config.client_options().fake_create_set_file.is_none());
        assert!(config.desired().unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_label() {
        let config = Config::parse(
            "[resources.junos_application.\"a.b\"]\nname = \"x\"\n",
            PathBuf::new(),
        )
        .unwrap();
        let err = config.desired().unwrap_err();
        assert!(err.to_string().contains("invalid label"));
    }

    #[test]
    fn test_rejects_unknown_provider_key() {
        assert!(Config::parse("[provider]\nhost = \"r1\"\n", PathBuf::new()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read config file"));
    }
}
