//! The structural comparator.
//!
//! [`compare_nodes`] recursively compares two nodes from two trees and
//! reports what meaningfully changed: tag/attribute edits, text edits, and
//! child insertions/removals. `None` means the nodes are equivalent after
//! canonicalization.
//!
//! Two mutually recursive passes do the work:
//! - the **node comparator** dispatches on node kind and, for element
//!   pairs, scores their similarity from tag, attribute, and child
//!   differences;
//! - the **child list differ** aligns the two ordered child lists via
//!   [`lcsruns`] (on shallow keys: kind plus tag), turns inserted/removed
//!   runs into [`ChangeKind::Added`]/[`ChangeKind::Removed`] records, and
//!   feeds matched pairs back into the node comparator.
//!
//! The similarity ratio `1 - found/possible` decides whether an element
//! pair is the same logical node with edits
//! ([`DiffLevel::SameButDifferent`]) or so dissimilar it should be read as
//! an unrelated removal plus insertion ([`DiffLevel::NotTheSameNode`]).
//! Child insertions and removals weigh half as much as in-place edits:
//! list growth is a weaker dissimilarity signal than mutation.
//!
//! Because the aligner may probe the same candidate pair repeatedly, every
//! comparison result (including "no difference") is memoized per
//! invocation, keyed by the node-id pair.

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::trace;

use crate::canon::{canonicalize_attr, canonicalize_text};
use crate::dom::{ElementData, NodeData, NodeId, NodeKind, Tree};
use crate::serialize::serialize_node;
use lcsruns::Segment;

/// An element pair whose similarity falls below this is treated as two
/// unrelated nodes rather than one node with edits.
const SAME_NODE_THRESHOLD: f64 = 0.51;

/// How coarsely two compared nodes relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLevel {
    /// So dissimilar they should be read as a removal plus an insertion.
    NotTheSameNode,
    /// The same logical node, with the recorded edits.
    SameButDifferent,
}

/// What kind of change a [`Change`] record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// An element's tag or attributes changed (one record per element
    /// pair, however many attributes moved).
    Changed,
    /// A text, comment, or directive payload changed.
    ChangedText,
    /// A node exists only on the second side.
    Added,
    /// A node exists only on the first side.
    Removed,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeKind::Changed => "changed",
            ChangeKind::ChangedText => "changedText",
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// A pair of node ids, first-tree side then second-tree side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodePair {
    /// Id in the first tree
    pub a: NodeId,
    /// Id in the second tree
    pub b: NodeId,
}

/// One reported change, in document order of the traversal.
///
/// `Added`/`Removed` carry exactly one node (the side it exists on);
/// `Changed`/`ChangedText` carry one node per side. `context` names the
/// pair the change belongs to: the parent pair for child-level changes,
/// or the compared root pair itself for changes about the roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// What happened
    pub kind: ChangeKind,
    /// The owning pair (parent context, or the root pair at top level)
    pub context: NodePair,
    /// The node on the first side, if the change has one
    pub node_a: Option<NodeId>,
    /// The node on the second side, if the change has one
    pub node_b: Option<NodeId>,
}

impl Change {
    fn changed(a: NodeId, b: NodeId) -> Self {
        Change {
            kind: ChangeKind::Changed,
            context: NodePair { a, b },
            node_a: Some(a),
            node_b: Some(b),
        }
    }

    fn changed_text(a: NodeId, b: NodeId) -> Self {
        Change {
            kind: ChangeKind::ChangedText,
            context: NodePair { a, b },
            node_a: Some(a),
            node_b: Some(b),
        }
    }
}

/// The outcome of comparing two non-equivalent nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Same-node-with-edits or unrelated-nodes classification
    pub level: DiffLevel,
    /// The changes, in document order of the traversal
    pub changes: Vec<Change>,
}

/// A selector predicate marking subtrees as irrelevant to the diff.
///
/// Applies to elements only, and only when *both* sides of a compared pair
/// match some rule — a one-sided match is a real difference and is
/// reported as such.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreRule {
    /// Elements with this tag name
    Tag(String),
    /// Elements carrying this attribute; with `value` set, the attribute
    /// must also have that exact value
    Attr {
        /// Attribute name
        name: String,
        /// Required value, or `None` for mere presence
        value: Option<String>,
    },
}

impl IgnoreRule {
    fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        match self {
            IgnoreRule::Tag(tag) => tree.tag(id) == Some(tag.as_str()),
            IgnoreRule::Attr { name, value } => match tree.attr(id, name) {
                Some(actual) => value.as_deref().map_or(true, |v| v == actual),
                None => false,
            },
        }
    }
}

/// Configuration for one diff invocation.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Subtrees to skip when both sides match (see [`IgnoreRule`])
    pub ignore: Vec<IgnoreRule>,
}

/// Memoized comparison results, keyed by node-id pair.
///
/// Scoped to one tree pair and one set of options: ids are tree-local, so
/// reusing a cache across different trees would alias unrelated nodes, and
/// cached entries bake in the ignore rules they were computed under.
/// Within those bounds it may be threaded through any number of
/// [`compare_nodes_with_memo`] calls as a pure optimization — presence or
/// absence never changes a result, only the cost.
#[derive(Debug, Clone, Default)]
pub struct MemoCache {
    entries: HashMap<NodePair, Option<DiffResult>>,
}

impl MemoCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached pair results (including cached "no difference").
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compare two nodes and report the semantic changes between them.
///
/// Returns `None` when the nodes are equivalent after canonicalization.
/// A fresh memo cache is used for the invocation; use
/// [`compare_nodes_with_memo`] to reuse one across calls.
///
/// # Example
///
/// ```
/// use markdiff::{compare_nodes, parse_fragment, ChangeKind, DiffLevel, DiffOptions};
///
/// let old = parse_fragment("<div><p>Hello</p></div>");
/// let new = parse_fragment("<div><p>Hello</p><span>World</span></div>");
/// let result = compare_nodes(
///     &old,
///     old.children(old.root())[0],
///     &new,
///     new.children(new.root())[0],
///     &DiffOptions::default(),
/// )
/// .expect("the span is a real difference");
///
/// assert_eq!(result.level, DiffLevel::SameButDifferent);
/// assert_eq!(result.changes.len(), 1);
/// assert_eq!(result.changes[0].kind, ChangeKind::Added);
/// ```
pub fn compare_nodes(
    tree_a: &Tree,
    a: NodeId,
    tree_b: &Tree,
    b: NodeId,
    opts: &DiffOptions,
) -> Option<DiffResult> {
    let mut memo = MemoCache::new();
    compare_nodes_with_memo(tree_a, a, tree_b, b, opts, &mut memo)
}

/// Like [`compare_nodes`], but with a caller-owned memo cache.
pub fn compare_nodes_with_memo(
    tree_a: &Tree,
    a: NodeId,
    tree_b: &Tree,
    b: NodeId,
    opts: &DiffOptions,
    memo: &mut MemoCache,
) -> Option<DiffResult> {
    Differ {
        tree_a,
        tree_b,
        opts,
        memo,
    }
    .compare(a, b)
}

/// Shallow alignment key for child-list matching. Matched pairs are
/// re-examined recursively, so the key only needs to say "same kind of
/// node", not "equal node".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum AlignKey<'t> {
    Element(&'t str),
    Text,
    Comment,
    Directive,
}

impl<'t> AlignKey<'t> {
    fn of(tree: &'t Tree, id: NodeId) -> Self {
        match tree.data(id) {
            NodeData::Element(elem) => AlignKey::Element(&elem.tag),
            NodeData::Text(_) => AlignKey::Text,
            NodeData::Comment(_) => AlignKey::Comment,
            NodeData::Directive(_) => AlignKey::Directive,
        }
    }
}

/// One diff invocation over a fixed tree pair.
struct Differ<'a> {
    tree_a: &'a Tree,
    tree_b: &'a Tree,
    opts: &'a DiffOptions,
    memo: &'a mut MemoCache,
}

impl Differ<'_> {
    /// The node comparator: memo lookup, mutual-ignore short-circuit, then
    /// kind dispatch.
    fn compare(&mut self, a: NodeId, b: NodeId) -> Option<DiffResult> {
        let key = NodePair { a, b };
        if let Some(cached) = self.memo.entries.get(&key) {
            return cached.clone();
        }

        let result = self.compare_uncached(a, b);
        self.memo.entries.insert(key, result.clone());
        result
    }

    fn compare_uncached(&mut self, a: NodeId, b: NodeId) -> Option<DiffResult> {
        if self.is_ignored(self.tree_a, a) && self.is_ignored(self.tree_b, b) {
            trace!(%a, %b, "both sides ignored, skipping subtree");
            return None;
        }

        let (ta, tb) = (self.tree_a, self.tree_b);
        match (ta.data(a), tb.data(b)) {
            (NodeData::Element(ea), NodeData::Element(eb)) => self.compare_elements(a, b, ea, eb),
            (NodeData::Text(ra), NodeData::Text(rb)) => {
                if canonicalize_text(ra) == canonicalize_text(rb) {
                    None
                } else {
                    Some(DiffResult {
                        level: DiffLevel::SameButDifferent,
                        changes: vec![Change::changed_text(a, b)],
                    })
                }
            }
            (NodeData::Comment(_), NodeData::Comment(_))
            | (NodeData::Directive(_), NodeData::Directive(_)) => {
                // Compared by full reserialization, so the delimiters and
                // payload are judged as one unit.
                let sa = canonicalize_text(&serialize_node(ta, a));
                let sb = canonicalize_text(&serialize_node(tb, b));
                if sa == sb {
                    None
                } else {
                    Some(DiffResult {
                        level: DiffLevel::SameButDifferent,
                        changes: vec![Change::changed_text(a, b)],
                    })
                }
            }
            // Kind mismatch: never descends, always one Changed record.
            _ => Some(DiffResult {
                level: DiffLevel::NotTheSameNode,
                changes: vec![Change::changed(a, b)],
            }),
        }
    }

    /// Element similarity: count difference units against the maximum
    /// conceivable, then classify by the resulting ratio.
    fn compare_elements(
        &mut self,
        a: NodeId,
        b: NodeId,
        ea: &ElementData,
        eb: &ElementData,
    ) -> Option<DiffResult> {
        let mut possible = 1.0f64; // tag name is always in play
        let mut found = 0.0f64;
        let mut changes = Vec::new();
        let mut reported = false;

        if ea.tag != eb.tag {
            found += 1.0;
            changes.push(Change::changed(a, b));
            reported = true;
        }

        // Attribute-name union across both sides. Each mismatch counts
        // toward the score, but the pair gets at most one Changed record.
        let mut names: IndexSet<&str> = ea.attrs.keys().map(String::as_str).collect();
        names.extend(eb.attrs.keys().map(String::as_str));
        possible += names.len() as f64;
        for name in &names {
            let va = canonicalize_attr(ea.attrs.get(*name).map(String::as_str));
            let vb = canonicalize_attr(eb.attrs.get(*name).map(String::as_str));
            if va != vb {
                found += 1.0;
                if !reported {
                    changes.push(Change::changed(a, b));
                    reported = true;
                }
            }
        }

        possible += ea.children.len().max(eb.children.len()) as f64;
        let child_changes = self.diff_children(a, b);
        let self_pair = NodePair { a, b };
        for change in &child_changes {
            if change.context == self_pair {
                found += match change.kind {
                    ChangeKind::Added | ChangeKind::Removed => 0.5,
                    ChangeKind::Changed | ChangeKind::ChangedText => 1.0,
                };
            }
        }
        changes.extend(child_changes);

        if changes.is_empty() {
            return None;
        }

        let similarity = if possible == 0.0 {
            // Degenerate empty-element case; unreachable since the tag
            // always contributes, but keep the division guarded.
            1.0
        } else {
            1.0 - found / possible
        };
        trace!(%a, %b, found, possible, similarity, "scored element pair");

        let level = if similarity < SAME_NODE_THRESHOLD {
            DiffLevel::NotTheSameNode
        } else {
            DiffLevel::SameButDifferent
        };
        Some(DiffResult { level, changes })
    }

    /// The child list differ: align both ordered child lists, then walk
    /// the runs with one cursor per side.
    fn diff_children(&mut self, a: NodeId, b: NodeId) -> Vec<Change> {
        let (ta, tb) = (self.tree_a, self.tree_b);
        let kids_a = ta.children(a);
        let kids_b = tb.children(b);
        if kids_a.is_empty() && kids_b.is_empty() {
            return Vec::new();
        }

        let keys_a: Vec<AlignKey> = kids_a.iter().map(|&id| AlignKey::of(ta, id)).collect();
        let keys_b: Vec<AlignKey> = kids_b.iter().map(|&id| AlignKey::of(tb, id)).collect();
        let segments = lcsruns::align(&keys_a, &keys_b);
        trace!(
            %a, %b,
            len_a = kids_a.len(),
            len_b = kids_b.len(),
            runs = segments.len(),
            "aligned child lists"
        );

        let context = NodePair { a, b };
        let mut out = Vec::new();
        let (mut ia, mut ib) = (0usize, 0usize);
        for seg in segments {
            match seg {
                Segment::Matched(n) => {
                    for _ in 0..n {
                        let (ca, cb) = (kids_a[ia], kids_b[ib]);
                        ia += 1;
                        ib += 1;
                        let Some(result) = self.compare(ca, cb) else {
                            continue;
                        };
                        // Matched-but-edited children surface their own
                        // internal changes, not a wrapper record. Records
                        // about the pair itself get re-homed to this
                        // parent context; deeper records keep their own.
                        let child_pair = NodePair { a: ca, b: cb };
                        for mut change in result.changes {
                            if change.context == child_pair
                                && change.node_a == Some(ca)
                                && change.node_b == Some(cb)
                            {
                                change.context = context;
                            }
                            out.push(change);
                        }
                    }
                }
                Segment::Inserted(n) => {
                    for _ in 0..n {
                        out.push(Change {
                            kind: ChangeKind::Added,
                            context,
                            node_a: None,
                            node_b: Some(kids_b[ib]),
                        });
                        ib += 1;
                    }
                }
                Segment::Removed(n) => {
                    for _ in 0..n {
                        out.push(Change {
                            kind: ChangeKind::Removed,
                            context,
                            node_a: Some(kids_a[ia]),
                            node_b: None,
                        });
                        ia += 1;
                    }
                }
            }
        }
        out
    }

    /// The ignore filter. Elements only; non-elements are never ignored.
    fn is_ignored(&self, tree: &Tree, id: NodeId) -> bool {
        if self.opts.ignore.is_empty() || tree.kind(id) != NodeKind::Element {
            return false;
        }
        self.opts.ignore.iter().any(|rule| rule.matches(tree, id))
    }
}
