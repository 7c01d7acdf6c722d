//! Error types for line parsing and block reconciliation.

use thiserror::Error;

/// Errors raised while decoding device output into typed values.
///
/// Every variant names the keyword or line involved so a malformed
/// snapshot can be traced back to the exact device output.
#[derive(Debug, Error)]
pub enum Error {
    /// An integer keyword carried a value that is not a strict decimal.
    #[error("failed to parse integer for `{keyword}` from {value:?}")]
    InvalidInteger {
        /// Keyword whose value failed to parse
        keyword: String,
        /// Raw value as read from the device
        value: String,
    },

    /// A double quote was opened but never closed.
    #[error("unclosed quote in line: {line}")]
    UnclosedQuote {
        /// The offending line
        line: String,
    },

    /// A keyed block line did not start with a block identifier.
    #[error("missing block identifier in line: {line}")]
    MissingKey {
        /// The offending line
        line: String,
    },

    /// A keyword expected a value but the line ended.
    #[error("missing value for `{keyword}`")]
    MissingValue {
        /// Keyword with no value
        keyword: String,
    },
}

/// Result type for line codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_integer_message_names_keyword() {
        let err = Error::InvalidInteger {
            keyword: "inactivity-timeout".to_string(),
            value: "x1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("inactivity-timeout"));
        assert!(msg.contains("\"x1\""));
    }
}
