//! Arena-backed markup trees.
//!
//! A [`Tree`] owns all of its nodes in a flat arena; a [`NodeId`] is a
//! cheap, `Copy` index into that arena. Ids are assigned once at build
//! time, never reused, and are unique within their tree — the comparator
//! uses `(NodeId, NodeId)` pairs as memoization keys, so that stability
//! matters.
//!
//! Trees are built once (by the parser or by hand via [`Tree::new`] and
//! [`Tree::add_child`]) and then treated as read-only by everything in
//! this crate: the comparator only ever borrows them.

use indexmap::IndexMap;
use thiserror::Error;

/// Errors from tree construction and navigation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    /// Tried to attach a child or attribute to a non-element node.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}

/// Identifier of a node within one [`Tree`].
///
/// Only meaningful for the tree that produced it; indexing another tree
/// with it names an unrelated node (or panics if out of range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An element node
    Element,
    /// A text node
    Text,
    /// A comment node
    Comment,
    /// A directive node (doctype, processing instruction)
    Directive,
}

/// Payload of an element node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementData {
    /// The tag name (lowercase for HTML input)
    pub tag: String,
    /// Attributes as name-value pairs, names unique, in source order
    pub attrs: IndexMap<String, String>,
    /// Child node ids, in document order
    pub children: Vec<NodeId>,
}

/// A node's payload. Closed set: the comparator matches exhaustively over
/// these four kinds, so an "unrecognized kind" cannot reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element with tag, attributes, and children
    Element(ElementData),
    /// A text node with its raw payload
    Text(String),
    /// A comment with its raw interior text (without `<!--` / `-->`)
    Comment(String),
    /// A directive with its raw interior markup (without `<!` / `>`)
    Directive(String),
}

impl NodeData {
    /// Create an element payload with no attributes or children.
    pub fn element(tag: impl Into<String>) -> Self {
        NodeData::Element(ElementData {
            tag: tag.into(),
            ..ElementData::default()
        })
    }

    /// Create a text payload.
    pub fn text(raw: impl Into<String>) -> Self {
        NodeData::Text(raw.into())
    }

    /// Create a comment payload.
    pub fn comment(raw: impl Into<String>) -> Self {
        NodeData::Comment(raw.into())
    }

    /// Create a directive payload.
    pub fn directive(raw: impl Into<String>) -> Self {
        NodeData::Directive(raw.into())
    }

    /// The kind tag of this payload.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Directive(_) => NodeKind::Directive,
        }
    }
}

/// A markup tree: a root node plus an arena of all nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Tree {
    /// Create a tree consisting of a single root node.
    pub fn new(root: NodeData) -> Self {
        Tree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The root node's id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty. It never is: there is always a root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Append a child under `parent`, returning the new node's id.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> Result<NodeId, DomError> {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        match &mut self.nodes[parent.index()] {
            NodeData::Element(elem) => {
                elem.children.push(id);
                Ok(id)
            }
            _ => {
                // Roll back the orphan we just pushed.
                self.nodes.pop();
                Err(DomError::NotAnElement(parent))
            }
        }
    }

    /// Set an attribute on an element node.
    pub fn set_attr(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        match &mut self.nodes[id.index()] {
            NodeData::Element(elem) => {
                elem.attrs.insert(name.into(), value.into());
                Ok(())
            }
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    /// The payload of a node.
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.data(id).kind()
    }

    /// The node as an element, if it is one.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            NodeData::Element(elem) => Some(elem),
            _ => None,
        }
    }

    /// The node's tag name, if it is an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// An element's attribute value by name.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    /// A node's children, in document order. Empty for non-elements.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Element(elem) => &elem.children,
            _ => &[],
        }
    }

    /// Concatenated text content of the node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(elem) => {
                for &child in &elem.children {
                    self.collect_text(child, out);
                }
            }
            NodeData::Comment(_) | NodeData::Directive(_) => {}
        }
    }
}
