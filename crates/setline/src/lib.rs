//! # setline
//!
//! Bidirectional codec for the Junos flat configuration dialect.
//!
//! Junos accepts configuration as a sequence of `set <path> <value>` and
//! `delete <path>` statements, and prints the current configuration back in
//! the same shape with `show configuration <path> | display set relative`.
//! This crate provides both directions:
//!
//! - [`Renderer`]: typed values to ordered `set` lines
//! - [`Snapshot`] + [`KeywordTable`]: device output back to typed values
//! - [`block`]: routing lines of repeatable keyed blocks to the right entry,
//!   and duplicate identifier detection before rendering
//!
//! ## Example
//!
//! ```
//! use setline::{KeywordTable, Renderer, Snapshot};
//!
//! let mut r = Renderer::set("applications application app1");
//! r.word("protocol", Some("tcp"));
//! r.text("destination-port", Some("80"));
//! let lines = r.into_lines();
//! assert_eq!(lines[1], "set applications application app1 destination-port \"80\"");
//!
//! #[derive(Clone, Copy, PartialEq, Debug)]
//! enum Field { Protocol, DestinationPort }
//! let table = KeywordTable::new(&[
//!     ("protocol", Field::Protocol),
//!     ("destination-port", Field::DestinationPort),
//! ]);
//! let snapshot = Snapshot::parse("set protocol tcp\nset destination-port \"80\"\n");
//! let first = snapshot.lines().next().unwrap();
//! assert_eq!(table.lookup(first), Some((Field::Protocol, "tcp")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod error;
pub mod parse;
pub mod render;
pub mod snapshot;
pub mod token;

pub use block::{DuplicateKey, Keyed, append_or_merge, find_duplicate, find_duplicates, merge_line};
pub use error::{Error, Result};
pub use parse::{KeywordTable, int_value, required, take, text_value};
pub use render::{DELETE, Renderer, SET, delete_line};
pub use snapshot::Snapshot;
pub use token::{quote, tokenize, unquote, word};
