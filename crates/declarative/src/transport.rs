//! Device transport traits.
//!
//! The orchestrator only needs a handful of session primitives; SSH, NETCONF
//! framing and authentication live behind these traits.

use anyhow::Result;

/// Opens management sessions to one device.
pub trait Transport: Send + Sync {
    /// Open a session. The session is closed when dropped.
    fn open(&self) -> Result<Box<dyn Session + '_>>;
}

/// One management session.
///
/// Calls are blocking and attempted once.
pub trait Session {
    /// Run an operational command and return its text output.
    fn command(&mut self, cmd: &str) -> Result<String>;

    /// Load `set`/`delete` lines into the candidate configuration.
    fn config_set(&mut self, lines: &[String]) -> Result<()>;

    /// Take the exclusive candidate configuration lock.
    fn config_lock(&mut self) -> Result<()>;

    /// Discard the candidate and release the lock, returning warnings.
    fn config_clear(&mut self) -> Vec<String>;

    /// Commit the candidate with a comment, returning warnings.
    ///
    /// A successful commit releases the lock.
    fn commit_conf(&mut self, message: &str) -> Result<Vec<String>>;
}
