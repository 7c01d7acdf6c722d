//! In-memory device with Junos candidate/commit semantics.
//!
//! The device holds a running configuration and, while a session has the
//! configuration lock, a candidate copy that `config_set` edits.
//! `commit_conf` promotes the candidate and releases the lock;
//! `config_clear` throws it away. Other sessions wait for the lock up to a
//! timeout. When backed by a file, the running configuration is loaded from
//! it and written back after every commit.

use crate::cmd::show_config_path;
use crate::error::{Error, Result};
use crate::store::ConfigStore;
use chrono::{DateTime, Utc};
use declarative::{Session, Transport};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default time a session waits for the configuration lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// One successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Commit comment
    pub comment: String,
    /// Commit time
    pub at: DateTime<Utc>,
    /// Number of statements after the commit
    pub statements: usize,
}

#[derive(Debug, Default)]
struct DeviceState {
    running: ConfigStore,
    candidate: ConfigStore,
    locked_by: Option<u64>,
    commits: Vec<CommitRecord>,
}

/// A device kept in memory, optionally persisted as a `set` file.
#[derive(Debug)]
pub struct MemoryDevice {
    state: Mutex<DeviceState>,
    released: Condvar,
    lock_timeout: Duration,
    path: Option<PathBuf>,
    next_session: AtomicU64,
}

impl Default for MemoryDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDevice {
    /// An empty device.
    pub fn new() -> Self {
        Self::with_config(ConfigStore::new())
    }

    /// A device starting from `running`.
    pub fn with_config(running: ConfigStore) -> Self {
        Self {
            state: Mutex::new(DeviceState {
                running,
                ..DeviceState::default()
            }),
            released: Condvar::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            path: None,
            next_session: AtomicU64::new(1),
        }
    }

    /// Load the running configuration from `path` and persist commits there.
    ///
    /// A missing file is an empty configuration.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let running = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            ConfigStore::parse(&text)?
        } else {
            ConfigStore::new()
        };
        debug!(
            "loaded {} statement(s) from {}",
            running.len(),
            path.display()
        );
        let mut device = Self::with_config(running);
        device.path = Some(path);
        Ok(device)
    }

    /// Set how long sessions wait for the lock.
    #[must_use]
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Running configuration as `set` lines.
    pub fn running_lines(&self) -> Vec<String> {
        self.state().running.to_lines()
    }

    /// Commit history, oldest first.
    pub fn commits(&self) -> Vec<CommitRecord> {
        self.state().commits.clone()
    }

    fn save(&self, running: &ConfigStore) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut text = running.to_lines().join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        std::fs::write(path, text).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })
    }
}

impl Transport for MemoryDevice {
    fn open(&self) -> anyhow::Result<Box<dyn Session + '_>> {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        debug!("session {id} opened");
        Ok(Box::new(MemorySession { device: self, id }))
    }
}

/// A session on a [`MemoryDevice`]. Dropping it releases a held lock.
pub struct MemorySession<'a> {
    device: &'a MemoryDevice,
    id: u64,
}

impl MemorySession<'_> {
    fn locked_state(&self) -> Result<MutexGuard<'_, DeviceState>> {
        let state = self.device.state();
        if state.locked_by == Some(self.id) {
            Ok(state)
        } else {
            Err(Error::NotLocked)
        }
    }

    fn release(&self, state: &mut DeviceState) {
        state.locked_by = None;
        self.device.released.notify_all();
    }
}

impl Session for MemorySession<'_> {
    fn command(&mut self, cmd: &str) -> anyhow::Result<String> {
        let path = show_config_path(cmd).ok_or_else(|| Error::UnknownCommand(cmd.to_string()))?;
        let lines = self.device.state().running.show(path)?;
        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    fn config_set(&mut self, lines: &[String]) -> anyhow::Result<()> {
        let mut state = self.locked_state()?;
        for line in lines {
            state.candidate.apply(line)?;
        }
        debug!("session {}: loaded {} line(s)", self.id, lines.len());
        Ok(())
    }

    fn config_lock(&mut self) -> anyhow::Result<()> {
        let deadline = Instant::now() + self.device.lock_timeout;
        let mut state = self.device.state();
        while state.locked_by.is_some_and(|holder| holder != self.id) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::LockTimeout {
                    secs: self.device.lock_timeout.as_secs(),
                }
                .into());
            }
            state = self
                .device
                .released
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        state.locked_by = Some(self.id);
        state.candidate = state.running.clone();
        debug!("session {}: configuration locked", self.id);
        Ok(())
    }

    fn config_clear(&mut self) -> Vec<String> {
        let mut state = self.device.state();
        if state.locked_by != Some(self.id) {
            return vec![Error::NotLocked.to_string()];
        }
        state.candidate = state.running.clone();
        self.release(&mut state);
        debug!("session {}: candidate discarded", self.id);
        Vec::new()
    }

    fn commit_conf(&mut self, message: &str) -> anyhow::Result<Vec<String>> {
        let mut state = self.locked_state()?;
        let mut warnings = Vec::new();
        if state.candidate == state.running {
            warnings.push("configuration check succeeds, no changes to commit".to_string());
        }
        let candidate = state.candidate.clone();
        self.device.save(&candidate)?;
        state.running = candidate;
        let record = CommitRecord {
            comment: message.to_string(),
            at: Utc::now(),
            statements: state.running.len(),
        };
        info!("commit complete: {message}");
        state.commits.push(record);
        self.release(&mut state);
        Ok(warnings)
    }
}

impl Drop for MemorySession<'_> {
    fn drop(&mut self) {
        let mut state = self.device.state();
        if state.locked_by == Some(self.id) {
            debug!("session {}: closed while locked, discarding candidate", self.id);
            state.candidate = state.running.clone();
            self.release(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::show_config;
    use std::sync::Arc;
    use std::thread;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_commit_promotes_candidate() {
        let device = MemoryDevice::new();
        let mut session = device.open().unwrap();
        session.config_lock().unwrap();
        session
            .config_set(&lines(&["set applications application app1 protocol tcp"]))
            .unwrap();

        // not visible before commit
        let out = session.command(&show_config("applications application app1")).unwrap();
        assert!(out.is_empty());

        let warnings = session.commit_conf("create resource junos_application").unwrap();
        assert!(warnings.is_empty());
        let out = session.command(&show_config("applications application app1")).unwrap();
        assert_eq!(out, "set protocol tcp\n");
        assert_eq!(device.commits().len(), 1);
        assert_eq!(device.commits()[0].comment, "create resource junos_application");
    }

    #[test]
    fn test_set_requires_lock() {
        let device = MemoryDevice::new();
        let mut session = device.open().unwrap();
        let err = session.config_set(&lines(&["set a b"])).unwrap_err();
        assert!(err.to_string().contains("not locked"));
        assert!(session.commit_conf("x").is_err());
    }

    #[test]
    fn test_clear_discards_and_unlocks() {
        let device = MemoryDevice::new();
        let mut session = device.open().unwrap();
        session.config_lock().unwrap();
        session.config_set(&lines(&["set a b"])).unwrap();
        assert!(session.config_clear().is_empty());
        assert!(device.running_lines().is_empty());

        // a second clear has nothing to release
        assert_eq!(session.config_clear().len(), 1);

        let mut other = device.open().unwrap();
        other.config_lock().unwrap();
    }

    #[test]
    fn test_lock_timeout() {
        let device = MemoryDevice::new().lock_timeout(Duration::from_millis(50));
        let mut first = device.open().unwrap();
        first.config_lock().unwrap();
        let mut second = device.open().unwrap();
        let err = second.config_lock().unwrap_err();
        assert!(err.to_string().contains("locked by another session"));
    }

    #[test]
    fn test_drop_releases_lock() {
        let device = MemoryDevice::new().lock_timeout(Duration::from_millis(50));
        {
            let mut first = device.open().unwrap();
            first.config_lock().unwrap();
            first.config_set(&lines(&["set a b"])).unwrap();
        }
        let mut second = device.open().unwrap();
        second.config_lock().unwrap();
        assert!(device.running_lines().is_empty());
    }

    #[test]
    fn test_waiting_session_gets_lock() {
        let device = Arc::new(MemoryDevice::new().lock_timeout(Duration::from_secs(5)));
        let mut first = device.open().unwrap();
        first.config_lock().unwrap();

        let waiter = {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                let mut second = device.open().unwrap();
                second.config_lock().unwrap();
                second.config_set(&lines(&["set b c"])).unwrap();
                second.commit_conf("second").unwrap();
            })
        };

        first.config_set(&lines(&["set a b"])).unwrap();
        first.commit_conf("first").unwrap();
        drop(first);
        waiter.join().unwrap();

        assert_eq!(device.running_lines(), vec!["set a b", "set b c"]);
        let comments: Vec<_> = device.commits().into_iter().map(|c| c.comment).collect();
        assert_eq!(comments, vec!["first", "second"]);
    }

    #[test]
    fn test_file_backed_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.set");
        std::fs::write(&path, "set system syslog file messages any any\n").unwrap();

        let device = MemoryDevice::open_file(&path).unwrap();
        let mut session = device.open().unwrap();
        session.config_lock().unwrap();
        session
            .config_set(&lines(&[
                "delete system syslog file messages",
                "set system syslog file interactive-commands interactive-commands any",
            ]))
            .unwrap();
        session.commit_conf("update").unwrap();
        drop(session);

        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            saved,
            "set system syslog file interactive-commands interactive-commands any\n"
        );
        let reloaded = MemoryDevice::open_file(&path).unwrap();
        assert_eq!(reloaded.running_lines().len(), 1);
    }

    #[test]
    fn test_unknown_command() {
        let device = MemoryDevice::new();
        let mut session = device.open().unwrap();
        assert!(session.command("show version").is_err());
    }
}
