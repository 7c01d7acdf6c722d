//! Error taxonomy for resource operations.
//!
//! Errors are categorized by the stage that raised them. The category tells
//! the caller whether the device may have been touched: validation and render
//! errors never reach the device, transport errors have already been
//! compensated by a configuration clear, and post-check errors follow a
//! commit that reported success.

use crate::diag::{AttrPath, Diagnostics};
use setline::DuplicateKey;
use thiserror::Error;

/// Stage at which an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Configuration rejected before contacting the device
    Validation,
    /// Existence check before mutating failed or disagreed
    PreCheck,
    /// Invariant broken while rendering lines
    Render,
    /// The transport reported a failure
    Transport,
    /// The object is not in the expected state after commit
    PostCheck,
    /// Device output could not be decoded
    Parse,
    /// The requested object is not on the device
    NotFound,
    /// Local bookkeeping (set file, state encoding) failed
    Local,
}

impl ErrorCategory {
    /// Whether the device may have been changed when this error surfaced.
    pub fn device_touched(&self) -> bool {
        matches!(self, Self::PostCheck)
    }

    /// Get a user-friendly description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Configuration is invalid",
            Self::PreCheck => "Device state does not allow this operation",
            Self::Render => "Configuration could not be rendered",
            Self::Transport => "Device session failed",
            Self::PostCheck => "Commit succeeded but device state is unexpected",
            Self::Parse => "Device output could not be read",
            Self::NotFound => "Object not found on device",
            Self::Local => "Local operation failed",
        }
    }
}

/// A render-time violation with the path it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{summary}: {message} (at {path})")]
pub struct RenderError {
    /// Short category
    pub summary: &'static str,
    /// Offending attribute
    pub path: AttrPath,
    /// Explanation
    pub message: String,
}

impl RenderError {
    /// A generic render error.
    pub fn new(path: AttrPath, message: impl Into<String>) -> Self {
        Self {
            summary: "Render Error",
            path,
            message: message.into(),
        }
    }

    /// Two keyed blocks under `block` share a name.
    pub fn duplicate(parent: &AttrPath, block: &str, dup: &DuplicateKey) -> Self {
        Self {
            summary: crate::diag::summary::DUPLICATE,
            path: parent.join(block).index(dup.index),
            message: format!(
                "multiple blocks {block} with the same name {} (first at index {})",
                dup.key, dup.first
            ),
        }
    }
}

/// Errors returned by resource operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Validation failed; no device operation was attempted.
    #[error("invalid configuration for {resource}:\n{diagnostics}")]
    Validation {
        /// Resource type and identity
        resource: String,
        /// Every violation found
        diagnostics: Diagnostics,
    },

    /// Existence check before a mutation failed.
    #[error("{summary}: {message}")]
    PreCheck {
        /// Short category
        summary: &'static str,
        /// Explanation
        message: String,
    },

    /// Rendering found an invariant violation.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The transport failed.
    #[error("{summary}: {message}")]
    Transport {
        /// Which call failed, e.g. `Config Commit Error`
        summary: &'static str,
        /// Transport error text
        message: String,
    },

    /// Commit succeeded but the object is not in the expected state.
    #[error("{summary}: {message}")]
    PostCheck {
        /// Short category
        summary: &'static str,
        /// Explanation
        message: String,
    },

    /// Device output was malformed.
    #[error("Config Read Error: {0}")]
    Parse(#[from] setline::Error),

    /// The object was not found on the device.
    #[error("Not Found: {message}")]
    NotFound {
        /// Explanation, including the expected ID format for imports
        message: String,
    },

    /// Writing the fake set file failed.
    #[error("Set File Error: {0}")]
    SetFile(#[from] std::io::Error),

    /// Attributes could not be converted to or from their typed form.
    #[error("Attribute Encoding Error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// No handler is registered for a resource type.
    #[error("unknown resource type: {0}")]
    UnknownType(String),
}

impl Error {
    /// Build a transport error from a collaborator failure.
    pub fn transport(summary: &'static str, err: &anyhow::Error) -> Self {
        Self::Transport {
            summary,
            message: format!("{err:#}"),
        }
    }

    /// Append warnings under `summary` to the message of a device-side error.
    ///
    /// Errors that carry no message (validation, render, local) are returned
    /// unchanged.
    #[must_use]
    pub fn with_warnings(mut self, summary: &str, warnings: &[String]) -> Self {
        if let Self::PreCheck { message, .. }
        | Self::Transport { message, .. }
        | Self::PostCheck { message, .. }
        | Self::NotFound { message } = &mut self
        {
            for w in warnings {
                message.push('\n');
                message.push_str(summary);
                message.push_str(": ");
                message.push_str(w);
            }
        }
        self
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::PreCheck { .. } => ErrorCategory::PreCheck,
            Self::Render(_) => ErrorCategory::Render,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::PostCheck { .. } => ErrorCategory::PostCheck,
            Self::Parse(_) => ErrorCategory::Parse,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::SetFile(_) | Self::Encoding(_) | Self::UnknownType(_) => ErrorCategory::Local,
        }
    }

    /// The short summary line, as shown to users.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Invalid Configuration",
            Self::PreCheck { summary, .. }
            | Self::Transport { summary, .. }
            | Self::PostCheck { summary, .. } => *summary,
            Self::Render(e) => e.summary,
            Self::Parse(_) => "Config Read Error",
            Self::NotFound { .. } => "Not Found",
            Self::SetFile(_) => "Set File Error",
            Self::Encoding(_) => "Attribute Encoding Error",
            Self::UnknownType(_) => "Unknown Resource Type",
        }
    }

    /// Diagnostics attached to a validation error.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Validation { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

/// Result type for resource operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_render_error_path() {
        let dup = DuplicateKey {
            index: 2,
            first: 0,
            key: "t1".into(),
        };
        let err = RenderError::duplicate(&AttrPath::root(), "term", &dup);
        assert_eq!(err.path.to_string(), "term[2]");
        assert_eq!(err.summary, "Duplicate Configuration Error");
        assert!(err.message.contains("t1"));
    }

    #[test]
    fn test_categories() {
        let err = Error::transport("Config Commit Error", &anyhow::anyhow!("commit failed"));
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert_eq!(err.summary(), "Config Commit Error");
        assert_eq!(err.to_string(), "Config Commit Error: commit failed");
        assert!(!err.category().device_touched());

        let err = Error::PostCheck {
            summary: "Not Found After Commit",
            message: "x".into(),
        };
        assert!(err.category().device_touched());
    }

    #[test]
    fn test_with_warnings_appends() {
        let err = Error::transport("Config Set Error", &anyhow::anyhow!("syntax error"))
            .with_warnings("Config Clear/Unlock Warning", &["not locked".to_string()]);
        assert_eq!(
            err.to_string(),
            "Config Set Error: syntax error\nConfig Clear/Unlock Warning: not locked"
        );

        let err: Error = RenderError::new(AttrPath::attr("x"), "bad").into();
        let err = err.with_warnings("W", &["ignored".to_string()]);
        assert!(!err.to_string().contains("ignored"));
    }

    #[test]
    fn test_render_error_converts() {
        let err: Error = RenderError::new(AttrPath::attr("then"), "bad").into();
        assert_eq!(err.category(), ErrorCategory::Render);
        assert_eq!(err.summary(), "Render Error");
    }
}
