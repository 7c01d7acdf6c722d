//! Device-side errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the in-memory device.
#[derive(Debug, Error)]
pub enum Error {
    /// Another session held the lock past the timeout.
    #[error("configuration database locked by another session (waited {secs}s)")]
    LockTimeout {
        /// Seconds waited
        secs: u64,
    },

    /// A configuration call needs the lock this session does not hold.
    #[error("configuration database is not locked by this session")]
    NotLocked,

    /// A line is neither `set` nor `delete`, or has no path.
    #[error("syntax error: {line}")]
    Syntax {
        /// The offending line
        line: String,
    },

    /// The command is not supported.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A line could not be tokenized.
    #[error(transparent)]
    Parse(#[from] setline::Error),

    /// Reading or writing the configuration file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Result type for device operations.
pub type Result<T> = std::result::Result<T, Error>;
