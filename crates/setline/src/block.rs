//! Keyed block reconciliation.
//!
//! Lines for one repeatable block (one `term`, one `policy`) can arrive in any
//! order and interleaved with lines of other blocks. Reconciliation routes
//! each line to the block named by its identifier, creating the block on
//! first sight, so the result does not depend on line order.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::token::{next_token, unquote};

/// A block identified by a name.
pub trait Keyed {
    /// The identifier of this block.
    fn key(&self) -> &str;

    /// A block holding only its identifier.
    fn with_key(key: String) -> Self;
}

/// Return the block named `key`, appending a new one if none exists yet.
pub fn append_or_merge<'a, B: Keyed>(blocks: &'a mut Vec<B>, key: &str) -> &'a mut B {
    let index = match blocks.iter().position(|b| b.key() == key) {
        Some(i) => i,
        None => {
            blocks.push(B::with_key(key.to_string()));
            blocks.len() - 1
        }
    };
    &mut blocks[index]
}

/// Split a (possibly quoted) block identifier from the front of `rest`.
pub fn split_key(rest: &str) -> Result<(String, &str)> {
    match next_token(rest)? {
        Some((token, remainder)) => Ok((unquote(token).to_string(), remainder)),
        None => Err(Error::MissingKey {
            line: rest.to_string(),
        }),
    }
}

/// Route a block line (`<key> <remainder>`) to its block.
///
/// Returns the target block and the part of the line after the identifier.
pub fn merge_line<'a, 'r, B: Keyed>(
    blocks: &'a mut Vec<B>,
    rest: &'r str,
) -> Result<(&'a mut B, &'r str)> {
    let (key, remainder) = split_key(rest)?;
    Ok((append_or_merge(blocks, &key), remainder))
}

/// Two blocks sharing an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    /// Index of the later, offending block
    pub index: usize,
    /// Index of the first block using the identifier
    pub first: usize,
    /// The shared identifier
    pub key: String,
}

/// Find the first repeated identifier.
///
/// Identifiers are compared as raw strings, so names differing only in
/// case are distinct.
pub fn find_duplicate<B: Keyed>(blocks: &[B]) -> Option<DuplicateKey> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, block) in blocks.iter().enumerate() {
        if let Some(&first) = seen.get(block.key()) {
            return Some(DuplicateKey {
                index,
                first,
                key: block.key().to_string(),
            });
        }
        seen.insert(block.key(), index);
    }
    None
}

/// Find every repeated identifier, for exhaustive validation.
pub fn find_duplicates<B: Keyed>(blocks: &[B]) -> Vec<DuplicateKey> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        match seen.get(block.key()) {
            Some(&first) => duplicates.push(DuplicateKey {
                index,
                first,
                key: block.key().to_string(),
            }),
            None => {
                seen.insert(block.key(), index);
            }
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Term {
        name: String,
        protocol: Option<String>,
        port: Option<String>,
    }

    impl Keyed for Term {
        fn key(&self) -> &str {
            &self.name
        }

        fn with_key(key: String) -> Self {
            Self {
                name: key,
                ..Default::default()
            }
        }
    }

    fn reconcile(lines: &[&str]) -> Vec<Term> {
        let mut terms: Vec<Term> = Vec::new();
        for line in lines {
            let (term, rest) = merge_line(&mut terms, line).unwrap();
            if let Some(v) = rest.strip_prefix("protocol ") {
                term.protocol = Some(v.to_string());
            } else if let Some(v) = rest.strip_prefix("destination-port ") {
                term.port = Some(unquote(v).to_string());
            }
        }
        terms
    }

    #[test]
    fn test_non_contiguous_lines_merge_into_one_block() {
        let terms = reconcile(&[
            "t1 protocol tcp",
            "t2 protocol udp",
            "t1 destination-port \"80\"",
        ]);
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].name, "t1");
        assert_eq!(terms[0].protocol.as_deref(), Some("tcp"));
        assert_eq!(terms[0].port.as_deref(), Some("80"));
        assert_eq!(terms[1].protocol.as_deref(), Some("udp"));
    }

    #[test]
    fn test_reconciliation_is_order_independent() {
        let lines = [
            "t1 protocol tcp",
            "t2 protocol udp",
            "t1 destination-port \"80\"",
            "t2 destination-port \"53\"",
        ];
        let mut reference = reconcile(&lines);
        reference.sort_by(|a, b| a.name.cmp(&b.name));

        let permutations: [[usize; 4]; 4] = [[3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1], [0, 3, 1, 2]];
        for order in permutations {
            let shuffled: Vec<&str> = order.iter().map(|&i| lines[i]).collect();
            let mut terms = reconcile(&shuffled);
            terms.sort_by(|a, b| a.name.cmp(&b.name));
            assert_eq!(terms, reference);
        }
    }

    #[test]
    fn test_quoted_key() {
        let terms = reconcile(&["\"my term\" protocol tcp"]);
        assert_eq!(terms[0].name, "my term");
    }

    #[test]
    fn test_split_key_missing() {
        assert!(matches!(split_key("  "), Err(Error::MissingKey { .. })));
    }

    #[test]
    fn test_find_duplicate() {
        let terms = vec![
            Term::with_key("a".into()),
            Term::with_key("b".into()),
            Term::with_key("a".into()),
        ];
        assert_eq!(
            find_duplicate(&terms),
            Some(DuplicateKey {
                index: 2,
                first: 0,
                key: "a".into()
            })
        );
    }

    #[test]
    fn test_duplicates_are_case_sensitive() {
        let terms = vec![Term::with_key("web".into()), Term::with_key("Web".into())];
        assert!(find_duplicate(&terms).is_none());
    }

    #[test]
    fn test_find_duplicates_collects_all() {
        let terms = vec![
            Term::with_key("a".into()),
            Term::with_key("a".into()),
            Term::with_key("b".into()),
            Term::with_key("b".into()),
            Term::with_key("a".into()),
        ];
        let dups = find_duplicates(&terms);
        assert_eq!(dups.len(), 3);
        assert_eq!(dups[2].index, 4);
        assert_eq!(dups[2].first, 0);
    }
}
