//! # junos
//!
//! Junos device access for declarative resources.
//!
//! - [`cmd`]: the CLI commands resources use to read configuration
//! - [`ConfigStore`]: a flat `set`-statement configuration with subtree
//!   deletes and relative display
//! - [`MemoryDevice`]: a [`declarative::Transport`] with candidate, lock and
//!   commit semantics, optionally persisted to a `set` file
//!
//! ## Example
//!
//! ```
//! use declarative::{Session, Transport};
//! use junos::{MemoryDevice, cmd};
//!
//! let device = MemoryDevice::new();
//! let mut session = device.open().unwrap();
//! session.config_lock().unwrap();
//! session
//!     .config_set(&["set applications application app1 protocol tcp".to_string()])
//!     .unwrap();
//! session.commit_conf("create resource junos_application").unwrap();
//!
//! let out = session
//!     .command(&cmd::show_config("applications application app1"))
//!     .unwrap();
//! assert_eq!(out, "set protocol tcp\n");
//! ```

pub mod cmd;
pub mod error;
pub mod memory;
pub mod store;

pub use error::{Error, Result};
pub use memory::{CommitRecord, DEFAULT_LOCK_TIMEOUT, MemoryDevice, MemorySession};
pub use store::ConfigStore;
