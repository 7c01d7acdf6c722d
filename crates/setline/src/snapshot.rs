//! Device configuration snapshots.
//!
//! A snapshot is the output of `show configuration <path> | display set
//! relative`: one `set ...` statement per line, relative to the requested
//! path. Blank output means the object does not exist.

/// Opening tag some transports wrap CLI output in.
const CONFIG_OUTPUT_START: &str = "<configuration-output>";

/// Closing tag matching [`CONFIG_OUTPUT_START`].
const CONFIG_OUTPUT_END: &str = "</configuration-output>";

/// The relative `set` statements of one object, with the verb stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    lines: Vec<String>,
}

impl Snapshot {
    /// Parse raw command output.
    ///
    /// Blank lines, `#` comments and transport wrapper tags are dropped and
    /// the leading `set ` is removed from every statement.
    pub fn parse(raw: &str) -> Self {
        let lines = raw
            .lines()
            .map(str::trim)
            .filter(|line| {
                !line.is_empty()
                    && !line.starts_with('#')
                    && !line.contains(CONFIG_OUTPUT_START)
                    && !line.contains(CONFIG_OUTPUT_END)
            })
            .map(|line| line.strip_prefix("set ").unwrap_or(line).to_string())
            .collect();
        Self { lines }
    }

    /// Whether the object is absent from the device.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Iterate over statements in device order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_output_is_empty() {
        assert!(Snapshot::parse("").is_empty());
        assert!(Snapshot::parse("\n").is_empty());
        assert!(Snapshot::parse("  \n\t\n").is_empty());
    }

    #[test]
    fn test_strips_verb_and_wrappers() {
        let raw = "<configuration-output>\nset protocol tcp\n\nset destination-port \"80\"\n</configuration-output>\n";
        let snapshot = Snapshot::parse(raw);
        assert_eq!(snapshot.len(), 2);
        let lines: Vec<_> = snapshot.lines().collect();
        assert_eq!(lines, vec!["protocol tcp", "destination-port \"80\""]);
    }

    #[test]
    fn test_skips_comments() {
        let snapshot = Snapshot::parse("## Last changed: 2024-01-01\nset count\n");
        assert_eq!(snapshot.lines().collect::<Vec<_>>(), vec!["count"]);
    }
}
