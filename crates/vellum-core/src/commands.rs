//! Template command types.
//!
//! A compiled template arrives as an ordered list of [`TemplateCmd`] values.
//! Vellum consumes this stream; it never produces or parses it. Begin/end
//! markers are balanced per template, and attribute lists are flattened
//! name/value pair vectors (even index = name, odd index = value).

use indexmap::IndexMap;

/// Identifier of a registered component template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateId(pub u32);

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded attribute mapping, in source order.
pub type AttrMap = IndexMap<String, String>;

/// One view-construction command.
///
/// `slot` on a command is the content-slot index of the node on its *host*
/// component: when the current insertion parent is a component node, a slotted
/// child lands in that component's projection bucket instead of the tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateCmd {
    /// A literal text node.
    Text {
        value: String,
        bound: bool,
        slot: Option<usize>,
    },
    /// Insertion point for nodes projected into the enclosing component.
    ContentSlot { index: usize, slot: Option<usize> },
    /// Opens an element; children follow until the matching `EndElement`.
    BeginElement {
        tag: String,
        /// Flattened name/value pairs.
        attributes: Vec<String>,
        bound: bool,
        slot: Option<usize>,
    },
    EndElement,
    /// Opens a component instance; its own template is interpreted separately.
    BeginComponent {
        tag: String,
        /// Flattened name/value pairs.
        attributes: Vec<String>,
        bound: bool,
        slot: Option<usize>,
        template_id: TemplateId,
    },
    EndComponent,
    /// Placeholder for a deferred embedded template.
    EmbeddedTemplate { merged: bool, slot: Option<usize> },
}

/// Decode a flattened attribute list into a map.
///
/// A trailing name with no value is dropped.
pub fn decode_attributes(pairs: &[String]) -> AttrMap {
    let mut attributes = AttrMap::with_capacity(pairs.len() / 2);
    for pair in pairs.chunks_exact(2) {
        attributes.insert(pair[0].clone(), pair[1].clone());
    }
    attributes
}
