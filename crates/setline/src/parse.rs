//! Keyword dispatch for parsing `display set relative` lines.
//!
//! Lines are matched against a [`KeywordTable`] whose entries are ordered by
//! specificity (most tokens first, then longest text). Matching also
//! respects token boundaries, so `source-address` never matches
//! `source-address-excluded` and `inactivity-timeout never` is always tried
//! before `inactivity-timeout`.

use crate::error::{Error, Result};
use crate::token::unquote;

/// Strip `keyword` from the front of `line` on a token boundary.
///
/// Returns the remainder (possibly empty) when the line starts with the
/// keyword followed by a space or the end of the line.
pub fn take<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(' ').map(str::trim_start)
}

/// A dispatch table from keywords to field tags.
#[derive(Debug, Clone)]
pub struct KeywordTable<K> {
    entries: Vec<(&'static str, K)>,
}

impl<K: Copy> KeywordTable<K> {
    /// Build a table, sorting entries from most to least specific.
    pub fn new(entries: &[(&'static str, K)]) -> Self {
        let mut entries = entries.to_vec();
        entries.sort_by(|(a, _), (b, _)| {
            let tokens = |s: &str| s.split(' ').count();
            tokens(b)
                .cmp(&tokens(a))
                .then_with(|| b.len().cmp(&a.len()))
        });
        Self { entries }
    }

    /// Find the most specific keyword matching the front of `line`.
    pub fn lookup<'a>(&self, line: &'a str) -> Option<(K, &'a str)> {
        self.entries
            .iter()
            .find_map(|(keyword, tag)| take(line, keyword).map(|rest| (*tag, rest)))
    }

    /// Keywords in match order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }
}

/// Require a non-empty value after `keyword`.
pub fn required<'a>(keyword: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::MissingValue {
            keyword: keyword.to_string(),
        });
    }
    Ok(value)
}

/// Decode a quoted or bare text value.
pub fn text_value(value: &str) -> String {
    unquote(value).to_string()
}

/// Decode a strict decimal integer.
///
/// Only an optional leading `-` followed by ASCII digits is accepted; any
/// other input is malformed device output.
pub fn int_value(keyword: &str, value: &str) -> Result<i64> {
    let raw = unquote(value);
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let invalid = || Error::InvalidInteger {
        keyword: keyword.to_string(),
        value: raw.to_string(),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<i64>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Source,
        SourceExcluded,
        Timeout,
        TimeoutNever,
    }

    #[test]
    fn test_take_respects_token_boundary() {
        assert_eq!(take("source-address any", "source-address"), Some("any"));
        assert_eq!(take("source-address-excluded", "source-address"), None);
        assert_eq!(take("count", "count"), Some(""));
    }

    #[test]
    fn test_table_prefers_more_specific_keyword() {
        // Declared least-specific first on purpose
        let table = KeywordTable::new(&[
            ("inactivity-timeout", Field::Timeout),
            ("inactivity-timeout never", Field::TimeoutNever),
            ("source-address", Field::Source),
            ("source-address-excluded", Field::SourceExcluded),
        ]);

        assert_eq!(
            table.lookup("inactivity-timeout never"),
            Some((Field::TimeoutNever, ""))
        );
        assert_eq!(
            table.lookup("inactivity-timeout 300"),
            Some((Field::Timeout, "300"))
        );
        assert_eq!(
            table.lookup("source-address-excluded"),
            Some((Field::SourceExcluded, ""))
        );
        assert_eq!(table.lookup("source-address h1"), Some((Field::Source, "h1")));
        assert_eq!(table.lookup("destination-address h1"), None);

        let order: Vec<_> = table.keywords().collect();
        assert_eq!(order[0], "inactivity-timeout never");
    }

    #[test]
    fn test_int_value_strict() {
        assert_eq!(int_value("k", "300").unwrap(), 300);
        assert_eq!(int_value("k", "\"42\"").unwrap(), 42);
        assert_eq!(int_value("k", "-7").unwrap(), -7);
        assert!(int_value("k", "+7").is_err());
        assert!(int_value("k", "3 00").is_err());
        assert!(int_value("k", "").is_err());
        assert!(matches!(
            int_value("lifetime-seconds", "abc"),
            Err(Error::InvalidInteger { keyword, .. }) if keyword == "lifetime-seconds"
        ));
    }

    #[test]
    fn test_required_and_text_value() {
        assert!(required("protocol", "").is_err());
        assert_eq!(required("protocol", "tcp").unwrap(), "tcp");
        assert_eq!(text_value("\"my app\""), "my app");
    }
}
