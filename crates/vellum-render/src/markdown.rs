//! Markdown serialization of node trees.
//!
//! Serialization is a depth-first walk: an element's wrapper markers bracket
//! the serialized children, components contribute nothing of their own, text
//! nodes emit their value, anchors emit nothing. There is no memoization;
//! every call walks the whole subtree, which is fine because serialization is
//! only triggered after discrete mutations.

use vellum_core::{NodeId, NodeKind, NodeTree};

/// Serialize a list of sibling nodes, in order.
pub fn render_nodes(tree: &NodeTree, nodes: &[NodeId]) -> String {
    let mut out = String::new();
    for &id in nodes {
        render_into(tree, id, &mut out);
    }
    out
}

/// Serialize a single subtree.
pub fn render_node(tree: &NodeTree, id: NodeId) -> String {
    let mut out = String::new();
    render_into(tree, id, &mut out);
    out
}

fn render_into(tree: &NodeTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Text { value, .. } => out.push_str(value),
        NodeKind::Anchor => {}
        NodeKind::Component { .. } => {
            for &child in &node.children {
                render_into(tree, child, out);
            }
        }
        NodeKind::Element { tag, attributes, .. } => {
            if tag == "md-link" {
                out.push('[');
                for &child in &node.children {
                    render_into(tree, child, out);
                }
                out.push_str("](");
                if let Some(url) = attributes.get("url") {
                    out.push_str(url);
                }
                out.push(')');
            } else {
                let marker = wrapper(tag);
                out.push_str(marker);
                for &child in &node.children {
                    render_into(tree, child, out);
                }
                out.push_str(marker);
            }
        }
    }
}

/// The symmetric wrapper marker for an element tag. Unrecognized tags are
/// transparent containers.
fn wrapper(tag: &str) -> &'static str {
    match tag {
        "bold" => "**",
        "italic" => "*",
        "header1" => "#",
        "header2" => "##",
        "header3" => "###",
        "header4" => "####",
        "header5" => "#####",
        "header6" => "######",
        _ => "",
    }
}
