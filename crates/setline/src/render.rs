//! Rendering typed values into `set` lines.
//!
//! A [`Renderer`] is bound to a path prefix (for example
//! `set applications application app1`) and appends one line per present
//! value. Absent, empty and `false` values emit nothing: omission is how
//! "unset" is expressed in the Junos dialect.

use crate::token::{quote, word};

/// Verb prefix for configuration lines that add statements.
pub const SET: &str = "set";

/// Verb prefix for configuration lines that remove statements.
pub const DELETE: &str = "delete";

/// Build a `delete` line for a configuration path.
pub fn delete_line(path: &str) -> String {
    format!("{DELETE} {path}")
}

/// Accumulates lines under a fixed prefix, in call order.
#[derive(Debug, Clone)]
pub struct Renderer {
    prefix: String,
    lines: Vec<String>,
}

impl Renderer {
    /// Create a renderer for `prefix` (no trailing space).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            lines: Vec::new(),
        }
    }

    /// Create a renderer for `set <path>`.
    pub fn set(path: &str) -> Self {
        Self::new(format!("{SET} {path}"))
    }

    /// The prefix every line starts with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of lines rendered so far.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no line has been rendered yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append `prefix rest` verbatim.
    pub fn line(&mut self, rest: &str) {
        self.lines.push(format!("{} {rest}", self.prefix));
    }

    /// Append an identifier or enumeration value, unquoted.
    pub fn word(&mut self, keyword: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.line(&format!("{keyword} {}", word(v)));
        }
    }

    /// Append a free-text value wrapped in double quotes.
    pub fn text(&mut self, keyword: &str, value: Option<&str>) {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.line(&format!("{keyword} {}", quote(v)));
        }
    }

    /// Append an integer value in decimal.
    pub fn int(&mut self, keyword: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.line(&format!("{keyword} {v}"));
        }
    }

    /// Append a bare keyword when `on` is true.
    pub fn flag(&mut self, keyword: &str, on: bool) {
        if on {
            self.line(keyword);
        }
    }

    /// Append one unquoted line per element, preserving order.
    pub fn words(&mut self, keyword: &str, values: &[String]) {
        for v in values {
            self.word(keyword, Some(v));
        }
    }

    /// Append one quoted line per element, preserving order.
    pub fn texts(&mut self, keyword: &str, values: &[String]) {
        for v in values {
            self.text(keyword, Some(v));
        }
    }

    /// Start a renderer for a keyed block, e.g. `term t1`.
    pub fn block(&self, keyword: &str, key: &str) -> Self {
        Self::new(format!("{} {keyword} {}", self.prefix, word(key)))
    }

    /// Start a renderer for a nested container, e.g. `structured-data`.
    pub fn child(&self, path: &str) -> Self {
        Self::new(format!("{} {path}", self.prefix))
    }

    /// Move every line of `child` into this renderer.
    ///
    /// A child that rendered nothing contributes its bare prefix so the
    /// container still exists on the device.
    pub fn append(&mut self, child: Self) {
        if child.lines.is_empty() {
            self.lines.push(child.prefix);
        } else {
            self.lines.extend(child.lines);
        }
    }

    /// Finish rendering.
    ///
    /// When nothing was rendered the bare prefix is returned so that the
    /// object itself is created.
    pub fn into_lines(self) -> Vec<String> {
        if self.lines.is_empty() {
            vec![self.prefix]
        } else {
            self.lines
        }
    }
}
