//! Flat configuration store.
//!
//! Configuration is kept the way `display set` prints it: one token list per
//! statement. Tokens keep their original quoting and are compared without
//! it, so `"80"` and `80` name the same value.

use crate::error::{Error, Result};
use setline::token::same_token;
use setline::{DELETE, SET, tokenize};

type Statement = Vec<String>;

/// Leaves that hold exactly one value; setting one replaces the old value.
///
/// Other leaves accumulate values the way `source-address` does.
const SINGLE_VALUED: &[&str] = &[
    // applications
    "alg",
    "application-protocol",
    "description",
    "destination-port",
    "ether-type",
    "icmp-code",
    "icmp-type",
    "icmp6-code",
    "icmp6-type",
    "inactivity-timeout",
    "protocol",
    "rpc-program-number",
    "source-port",
    "uuid",
    // ike and ipsec proposals
    "authentication-algorithm",
    "authentication-method",
    "dh-group",
    "encryption-algorithm",
    "lifetime-kilobytes",
    "lifetime-seconds",
    // syslog file facilities
    "any",
    "authorization",
    "change-log",
    "conflict-log",
    "daemon",
    "dfc",
    "external",
    "firewall",
    "ftp",
    "interactive-commands",
    "kernel",
    "match",
    "ntp",
    "pfe",
    "security",
    "user",
];

fn has_prefix(statement: &[String], prefix: &[String]) -> bool {
    statement.len() >= prefix.len()
        && statement
            .iter()
            .zip(prefix)
            .all(|(a, b)| same_token(a, b))
}

/// Whether `new` assigns the single-valued leaf that `old` already sets.
fn replaces(new: &[String], old: &[String]) -> bool {
    let n = new.len();
    n >= 2
        && old.len() == n
        && SINGLE_VALUED.iter().any(|k| same_token(&new[n - 2], k))
        && has_prefix(old, &new[..n - 1])
}

fn tokens(path: &str) -> Result<Statement> {
    Ok(tokenize(path)?.into_iter().map(str::to_string).collect())
}

/// An ordered set of configuration statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    statements: Vec<Statement>,
}

impl ConfigStore {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `set` lines, skipping blanks and `#` comments.
    pub fn parse(text: &str) -> Result<Self> {
        let mut store = Self::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            store.apply(line)?;
        }
        Ok(store)
    }

    /// Apply one `set` or `delete` line.
    pub fn apply(&mut self, line: &str) -> Result<()> {
        let mut statement = tokens(line)?;
        if statement.len() < 2 {
            return Err(Error::Syntax {
                line: line.to_string(),
            });
        }
        let verb = statement.remove(0);
        match verb.as_str() {
            SET => self.set(statement),
            DELETE => {
                self.delete(&statement);
            }
            _ => {
                return Err(Error::Syntax {
                    line: line.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Add a statement.
    ///
    /// A statement already implied by a longer one is not stored, and
    /// containers made redundant by the new statement are dropped. A new
    /// value for a single-valued leaf replaces the old one.
    pub fn set(&mut self, statement: Statement) {
        if self.statements.iter().any(|s| has_prefix(s, &statement)) {
            return;
        }
        self.statements
            .retain(|s| !has_prefix(&statement, s) && !replaces(&statement, s));
        self.statements.push(statement);
    }

    /// Remove a path and everything below it, returning how many statements
    /// were removed.
    pub fn delete(&mut self, path: &[String]) -> usize {
        let before = self.statements.len();
        self.statements.retain(|s| !has_prefix(s, path));
        before - self.statements.len()
    }

    /// Statements below `path`, relative to it, as `set` lines.
    ///
    /// A bare container with nothing configured below it prints nothing.
    pub fn show(&self, path: &str) -> Result<Vec<String>> {
        let path = tokens(path)?;
        Ok(self
            .statements
            .iter()
            .filter(|s| s.len() > path.len() && has_prefix(s, &path))
            .map(|s| format!("{SET} {}", s[path.len()..].join(" ")))
            .collect())
    }

    /// Every statement as a `set` line.
    pub fn to_lines(&self) -> Vec<String> {
        self.statements
            .iter()
            .map(|s| format!("{SET} {}", s.join(" ")))
            .collect()
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
