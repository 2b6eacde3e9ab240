//! Structural diffing of markup trees.
//!
//! markdiff compares two versions of an HTML-like document and reports
//! what meaningfully changed — tag and attribute edits, text edits, and
//! subtree insertions/removals — while tolerating cosmetic noise such as
//! whitespace, attribute-value formatting, and caller-marked ignorable
//! subtrees.
//!
//! markdiff provides:
//! - **Arena DOM**: flat [`Tree`] of typed nodes with stable ids
//! - **Parsing**: browser-compatible HTML5 parsing via html5ever
//! - **Serialization**: markup text for any node, with proper escaping
//! - **Diffing**: similarity-scored recursive comparison with an
//!   LCS-aligned child walk (via the `lcsruns` crate)
//!
//! # Example
//!
//! ```rust
//! use markdiff::{compare_nodes, parse_fragment, ChangeKind, DiffOptions};
//!
//! let old = parse_fragment("<ul><li>one</li></ul>");
//! let new = parse_fragment("<ul><li>one</li><li>two</li></ul>");
//!
//! let result = compare_nodes(
//!     &old,
//!     old.children(old.root())[0],
//!     &new,
//!     new.children(new.root())[0],
//!     &DiffOptions::default(),
//! )
//! .expect("one list item was added");
//!
//! assert_eq!(result.changes.len(), 1);
//! assert_eq!(result.changes[0].kind, ChangeKind::Added);
//!
//! // Cosmetic differences are not differences at all.
//! let reflowed = parse_fragment("<ul>\n  <li>one</li>\n</ul>");
//! assert!(compare_nodes(
//!     &old,
//!     old.children(old.root())[0],
//!     &reflowed,
//!     reflowed.children(reflowed.root())[0],
//!     &DiffOptions::default(),
//! )
//! .is_none());
//! ```

#![warn(missing_docs)]

pub mod canon;
pub mod diff;
pub mod dom;
mod parser;
pub mod serialize;

// Re-export parsing functions
pub use parser::{Document, parse_document, parse_fragment};

// Re-export serialization
pub use serialize::serialize_node;

// Re-export DOM types at crate root for convenience
pub use dom::{DomError, ElementData, NodeData, NodeId, NodeKind, Tree};

// Re-export the comparator surface
pub use diff::{
    Change, ChangeKind, DiffLevel, DiffOptions, DiffResult, IgnoreRule, MemoCache, NodePair,
    compare_nodes, compare_nodes_with_memo,
};
