//! Tokenizing and quoting for Junos configuration lines.
//!
//! Junos prints a value inside double quotes when it is free text or when it
//! contains whitespace. There is no escape syntax: a quote character inside a
//! value cannot be represented, so [`unquote`] simply trims quotes from both
//! ends.

use crate::error::{Error, Result};

/// The quote character used by the Junos CLI.
pub const QUOTE: char = '"';

/// Wrap a value in double quotes.
pub fn quote(value: &str) -> String {
    format!("{QUOTE}{value}{QUOTE}")
}

/// Strip surrounding double quotes from a value.
pub fn unquote(value: &str) -> &str {
    value.trim_matches(QUOTE)
}

/// Render an identifier the way Junos prints it: bare unless it contains
/// whitespace (or is empty), in which case it is quoted.
pub fn word(value: &str) -> String {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        quote(value)
    } else {
        value.to_string()
    }
}

/// Split the first token off `input`.
///
/// A token starting with a double quote extends to the matching closing
/// quote (quotes included); any other token ends at whitespace. Returns
/// `None` when `input` holds only whitespace.
pub fn next_token(input: &str) -> Result<Option<(&str, &str)>> {
    let input = input.trim_start();
    if input.is_empty() {
        return Ok(None);
    }

    if let Some(stripped) = input.strip_prefix(QUOTE) {
        let Some(end) = stripped.find(QUOTE) else {
            return Err(Error::UnclosedQuote {
                line: input.to_string(),
            });
        };
        // +2 covers both quote characters
        let (token, rest) = input.split_at(end + 2);
        return Ok(Some((token, rest.trim_start())));
    }

    let end = input.find(char::is_whitespace).unwrap_or(input.len());
    let (token, rest) = input.split_at(end);
    Ok(Some((token, rest.trim_start())))
}

/// Split a whole line into tokens.
pub fn tokenize(line: &str) -> Result<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut rest = line;
    while let Some((token, remainder)) = next_token(rest)? {
        tokens.push(token);
        rest = remainder;
    }
    Ok(tokens)
}

/// Compare two tokens ignoring surrounding quotes.
pub fn same_token(a: &str, b: &str) -> bool {
    unquote(a) == unquote(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_and_unquote() {
        assert_eq!(quote("80"), "\"80\"");
        assert_eq!(unquote("\"80\""), "80");
        assert_eq!(unquote("tcp"), "tcp");
    }

    #[test]
    fn test_word_quotes_only_when_needed() {
        assert_eq!(word("app1"), "app1");
        assert_eq!(word("my term"), "\"my term\"");
        assert_eq!(word(""), "\"\"");
    }

    #[test]
    fn test_tokenize_keeps_quoted_runs() {
        let tokens = tokenize(r#"term "my term" description "two words" protocol tcp"#).unwrap();
        assert_eq!(
            tokens,
            vec!["term", "\"my term\"", "description", "\"two words\"", "protocol", "tcp"]
        );
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        let tokens = tokenize("  set   applications  application app1 ").unwrap();
        assert_eq!(tokens, vec!["set", "applications", "application", "app1"]);
    }

    #[test]
    fn test_tokenize_unclosed_quote() {
        let err = tokenize(r#"description "oops"#).unwrap_err();
        assert!(matches!(err, Error::UnclosedQuote { .. }));
    }

    #[test]
    fn test_next_token_on_blank() {
        assert!(next_token("   ").unwrap().is_none());
    }

    #[test]
    fn test_same_token() {
        assert!(same_token("\"app1\"", "app1"));
        assert!(!same_token("app1", "App1"));
    }
}
