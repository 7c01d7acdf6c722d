//! Path-addressed diagnostics.
//!
//! Validation never stops at the first problem: every check pushes into a
//! [`Diagnostics`] collection, and each entry points at the exact attribute,
//! block index or block name it concerns (`term[1].inactivity_timeout`).

use serde::Serialize;
use std::fmt;

/// Human-readable summary categories shared by every resource.
pub mod summary {
    /// A required attribute or block is absent.
    pub const MISSING: &str = "Missing Configuration Error";
    /// An attribute value breaks one of its constraints.
    pub const INVALID: &str = "Invalid Attribute Value";
    /// An attribute has the wrong type.
    pub const TYPE: &str = "Attribute Type Error";
    /// Two mutually exclusive attributes are both set.
    pub const CONFLICT: &str = "Conflicting Configuration Error";
    /// Two keyed blocks share an identifier.
    pub const DUPLICATE: &str = "Duplicate Configuration Error";
    /// A block list has too few or too many entries.
    pub const BLOCK_COUNT: &str = "Invalid Block Count";
    /// Warnings from `config_clear` after a failed operation.
    pub const CLEAR_WARNING: &str = "Config Clear/Unlock Warning";
    /// Warnings from a successful commit.
    pub const COMMIT_WARNING: &str = "Config Commit Warning";
}

/// One step of an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum PathStep {
    /// A named attribute or block
    Attr(String),
    /// An element of a block list
    Index(usize),
}

/// Location of an attribute inside a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AttrPath(Vec<PathStep>);

impl AttrPath {
    /// The resource itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A top-level attribute.
    pub fn attr(name: &str) -> Self {
        Self::root().join(name)
    }

    /// Descend into a named attribute or block.
    pub fn join(&self, name: &str) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Attr(name.to_string()));
        Self(steps)
    }

    /// Descend into a list element.
    pub fn index(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Index(index));
        Self(steps)
    }

    /// Whether this path points at the resource itself.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The steps of this path.
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Attr(name) if i == 0 => write!(f, "{name}")?,
                PathStep::Attr(name) => write!(f, ".{name}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Blocks the operation
    Error,
    /// Reported, operation continues
    Warning,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Error or warning
    pub severity: Severity,
    /// Short category, see [`summary`]
    pub summary: String,
    /// Full explanation
    pub detail: String,
    /// Offending attribute, if any
    pub path: Option<AttrPath>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)?;
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, path: Option<AttrPath>, summary: &str, detail: String) {
        self.0.push(Diagnostic {
            severity,
            summary: summary.to_string(),
            detail,
            path,
        });
    }

    /// Record an error not tied to an attribute.
    pub fn error(&mut self, summary: &str, detail: impl Into<String>) {
        self.push(Severity::Error, None, summary, detail.into());
    }

    /// Record an error on `path`.
    pub fn error_at(&mut self, path: AttrPath, summary: &str, detail: impl Into<String>) {
        self.push(Severity::Error, Some(path), summary, detail.into());
    }

    /// Record a warning not tied to an attribute.
    pub fn warning(&mut self, summary: &str, detail: impl Into<String>) {
        self.push(Severity::Warning, None, summary, detail.into());
    }

    /// Whether any entry is an error.
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Iterate over errors only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Append every entry of `other`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Whether some entry is an error at exactly `path`.
    pub fn has_error_at(&self, path: &AttrPath) -> bool {
        self.errors().any(|d| d.path.as_ref() == Some(path))
    }

    /// Append entries of `other`, except errors at a path already flagged here.
    pub fn merge(&mut self, other: Self) {
        for d in other {
            let flagged = d.severity == Severity::Error
                && d.path.as_ref().is_some_and(|p| self.has_error_at(p));
            if !flagged {
                self.0.push(d);
            }
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}
