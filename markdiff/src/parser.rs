//! Markup ingestion via html5ever.
//!
//! Parsing happens before diffing and is deliberately thin: html5ever does
//! full HTML5 tree construction with error recovery, and this module just
//! flattens the resulting `RcDom` into our arena [`Tree`]. The comparator
//! itself never sees raw markup.
//!
//! Two entry points:
//! - [`parse_document`] for full documents (returns the doctype alongside
//!   the tree, rooted at `<html>`)
//! - [`parse_fragment`] for snippets (returns a tree rooted at a synthetic
//!   `<body>` element holding the fragment's nodes)
//!
//! Whitespace-only text nodes are dropped at ingestion: indentation and
//! reflow between elements are cosmetic, and a node that exists on one
//! side only would otherwise register as a structural insertion.

use html5ever::tendril::TendrilSink;
use html5ever::{
    ParseOpts, QualName, local_name, namespace_url, ns, parse_document as h5_parse_document,
    parse_fragment as h5_parse_fragment,
};
use markup5ever_rcdom::{Handle, NodeData as RcData, RcDom};

use crate::dom::{ElementData, NodeData, NodeId, Tree};

/// A parsed document: the doctype (if any) plus the tree rooted at the
/// `<html>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The DOCTYPE name (e.g. `"html"` for `<!DOCTYPE html>`)
    pub doctype: Option<String>,
    /// The tree, rooted at the `<html>` element
    pub tree: Tree,
}

/// Parse a complete document.
///
/// html5ever always synthesizes `<html>`, `<head>`, and `<body>`, so the
/// returned tree is never empty, whatever the input looked like.
pub fn parse_document(markup: &str) -> Document {
    let dom = h5_parse_document(RcDom::default(), ParseOpts::default()).one(markup);

    let mut doctype = None;
    let mut html = None;
    for child in dom.document.children.borrow().iter() {
        match &child.data {
            RcData::Doctype { name, .. } => doctype = Some(name.to_string()),
            RcData::Element { .. } => html = Some(child.clone()),
            _ => {}
        }
    }

    let tree = match html {
        Some(handle) => {
            let mut tree = Tree::new(NodeData::Element(element_data(&handle)));
            let root = tree.root();
            convert_children(&handle, &mut tree, root);
            tree
        }
        // Unreachable with html5ever's recovery, but don't panic on it.
        None => Tree::new(NodeData::element("html")),
    };

    Document { doctype, tree }
}

/// Parse a markup fragment in `<body>` context.
///
/// The returned tree is rooted at a synthetic `<body>` element whose
/// children are the fragment's top-level nodes; grab
/// `tree.children(tree.root())` to get at them.
pub fn parse_fragment(markup: &str) -> Tree {
    let dom = h5_parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("body")),
        vec![],
    )
    .one(markup);

    let mut tree = Tree::new(NodeData::element("body"));
    let root = tree.root();
    // Fragment parses come back as document > html > [fragment nodes].
    let document = dom.document.children.borrow();
    if let Some(html) = document.iter().find(|c| matches!(c.data, RcData::Element { .. })) {
        convert_children(html, &mut tree, root);
    }
    tree
}

/// Extract tag and attributes from an RcDom element handle.
fn element_data(handle: &Handle) -> ElementData {
    let mut elem = ElementData::default();
    if let RcData::Element { name, attrs, .. } = &handle.data {
        elem.tag = name.local.to_string();
        for attr in attrs.borrow().iter() {
            // html5ever already enforces first-wins on duplicate names.
            elem.attrs
                .insert(attr.name.local.to_string(), attr.value.to_string());
        }
    }
    elem
}

/// Recursively append the RcDom children of `handle` under `parent`.
fn convert_children(handle: &Handle, tree: &mut Tree, parent: NodeId) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            RcData::Element { .. } => {
                let id = tree
                    .add_child(parent, NodeData::Element(element_data(child)))
                    .expect("parent is an element");
                convert_children(child, tree, id);
            }
            RcData::Text { contents } => {
                let text = contents.borrow();
                // Whitespace-only text between elements is cosmetic
                // (indentation, reflow); keeping it out of the tree stops
                // it from surfacing as child insertions in a diff.
                if !text.chars().all(char::is_whitespace) {
                    tree.add_child(parent, NodeData::text(text.to_string()))
                        .expect("parent is an element");
                }
            }
            RcData::Comment { contents } => {
                tree.add_child(parent, NodeData::comment(contents.to_string()))
                    .expect("parent is an element");
            }
            RcData::ProcessingInstruction { target, contents } => {
                tree.add_child(
                    parent,
                    NodeData::directive(format!("{} {}", target, contents)),
                )
                .expect("parent is an element");
            }
            RcData::Doctype { name, .. } => {
                tree.add_child(parent, NodeData::directive(format!("DOCTYPE {}", name)))
                    .expect("parent is an element");
            }
            RcData::Document => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;

    #[test]
    fn test_parse_fragment_structure() {
        let tree = parse_fragment("<div class=\"a\"><p>Hello</p></div>");
        let root = tree.root();
        assert_eq!(tree.tag(root), Some("body"));

        let kids = tree.children(root);
        assert_eq!(kids.len(), 1);
        let div = kids[0];
        assert_eq!(tree.tag(div), Some("div"));
        assert_eq!(tree.attr(div, "class"), Some("a"));

        let p = tree.children(div)[0];
        assert_eq!(tree.tag(p), Some("p"));
        assert_eq!(tree.text_content(p), "Hello");
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let compact = parse_fragment("<ul><li>one</li></ul>");
        let reflowed = parse_fragment("<ul>\n  <li>one</li>\n</ul>");
        let ul_compact = compact.children(compact.root())[0];
        let ul_reflowed = reflowed.children(reflowed.root())[0];
        assert_eq!(compact.children(ul_compact).len(), 1);
        assert_eq!(reflowed.children(ul_reflowed).len(), 1);
    }

    #[test]
    fn test_parse_fragment_multiple_roots() {
        let tree = parse_fragment("<p>one</p><p>two</p>");
        assert_eq!(tree.children(tree.root()).len(), 2);
    }

    #[test]
    fn test_parse_fragment_comment() {
        let tree = parse_fragment("<div><!-- hi --></div>");
        let div = tree.children(tree.root())[0];
        let comment = tree.children(div)[0];
        assert_eq!(tree.kind(comment), NodeKind::Comment);
    }

    #[test]
    fn test_parse_document_doctype_and_root() {
        let doc = parse_document("<!DOCTYPE html><html><body><p>Hi</p></body></html>");
        assert_eq!(doc.doctype.as_deref(), Some("html"));
        assert_eq!(doc.tree.tag(doc.tree.root()), Some("html"));
        // html5ever synthesizes head and body.
        let kids = doc.tree.children(doc.tree.root());
        assert_eq!(kids.len(), 2);
        assert_eq!(doc.tree.tag(kids[1]), Some("body"));
    }

    #[test]
    fn test_parse_document_converts_nested_content() {
        let doc = parse_document(
            "<!DOCTYPE html><html><body><div id=\"w\"><p>deep <em>text</em></p></div></body></html>",
        );
        let body = doc.tree.children(doc.tree.root())[1];
        let div = doc.tree.children(body)[0];
        assert_eq!(doc.tree.attr(div, "id"), Some("w"));
        assert_eq!(doc.tree.text_content(div), "deep text");
    }

    #[test]
    fn test_parse_recovers_from_bad_markup() {
        // Unclosed tags are not an error, just recovered structure.
        let tree = parse_fragment("<div><p>unclosed");
        let div = tree.children(tree.root())[0];
        assert_eq!(tree.tag(div), Some("div"));
        assert_eq!(tree.text_content(div), "unclosed");
    }
}
