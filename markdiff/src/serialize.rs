//! Serialization of tree nodes back to markup text.
//!
//! - Void elements never get end tags
//! - Text content is escaped (`&`, `<`, `>`)
//! - Attribute values are escaped and double-quoted
//! - Comments serialize as `<!--...-->`, directives as `<!...>`
//!
//! The comparator relies on this for Comment and Directive nodes, which it
//! compares by canonicalized full serialization rather than field by
//! field; it is also useful on its own for debugging diff output.

use std::fmt::Write;

use crate::dom::{NodeData, NodeId, Tree};

/// HTML5 void elements - these never have end tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Check if a tag is a void element.
fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Serialize a node and its descendants to markup text.
pub fn serialize_node(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.data(id) {
        NodeData::Text(t) => write_escaped_text(t, out),
        NodeData::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        NodeData::Directive(d) => {
            out.push_str("<!");
            out.push_str(d);
            out.push('>');
        }
        NodeData::Element(elem) => {
            out.push('<');
            out.push_str(&elem.tag);
            for (name, value) in &elem.attrs {
                // String buffer writes cannot fail.
                let _ = write!(out, " {}=\"", name);
                write_escaped_attr(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&elem.tag) {
                return;
            }
            for &child in &elem.children {
                write_node(tree, child, out);
            }
            let _ = write!(out, "</{}>", elem.tag);
        }
    }
}

fn write_escaped_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn write_escaped_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_with_attrs_and_text() {
        let mut tree = Tree::new(NodeData::element("div"));
        tree.set_attr(tree.root(), "class", "box").unwrap();
        let p = tree.add_child(tree.root(), NodeData::element("p")).unwrap();
        tree.add_child(p, NodeData::text("Hello")).unwrap();
        assert_eq!(
            serialize_node(&tree, tree.root()),
            "<div class=\"box\"><p>Hello</p></div>"
        );
    }

    #[test]
    fn test_void_element_has_no_end_tag() {
        let mut tree = Tree::new(NodeData::element("p"));
        tree.add_child(tree.root(), NodeData::element("br")).unwrap();
        assert_eq!(serialize_node(&tree, tree.root()), "<p><br></p>");
    }

    #[test]
    fn test_text_escaping() {
        let mut tree = Tree::new(NodeData::element("p"));
        tree.add_child(tree.root(), NodeData::text("a < b & c"))
            .unwrap();
        assert_eq!(serialize_node(&tree, tree.root()), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_attr_escaping() {
        let mut tree = Tree::new(NodeData::element("div"));
        tree.set_attr(tree.root(), "title", "say \"hi\"").unwrap();
        assert_eq!(
            serialize_node(&tree, tree.root()),
            "<div title=\"say &quot;hi&quot;\"></div>"
        );
    }

    #[test]
    fn test_comment_and_directive() {
        let mut tree = Tree::new(NodeData::element("div"));
        tree.add_child(tree.root(), NodeData::comment(" note "))
            .unwrap();
        tree.add_child(tree.root(), NodeData::directive("DOCTYPE html"))
            .unwrap();
        assert_eq!(
            serialize_node(&tree, tree.root()),
            "<div><!-- note --><!DOCTYPE html></div>"
        );
    }
}
