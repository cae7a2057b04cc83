//! The presentation node tree.
//!
//! All nodes live in one arena owned by [`NodeTree`]; structural links are
//! plain [`NodeId`]s. `parent` is a non-owning back-reference used for
//! splice-based insert and remove, the owning direction is children-list to
//! child. Children order is document order and is preserved by every
//! mutation.

use std::collections::HashMap;

use crate::commands::AttrMap;
use crate::projection::ProjectionStore;

/// Unique identifier for a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// The closed set of node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A component instance. Structurally transparent in the serialized
    /// output; owns the projection buckets for its slotted children.
    Component {
        tag: String,
        bound: bool,
        attributes: AttrMap,
        /// True for the first component opened in a build.
        root: bool,
        projection: ProjectionStore,
    },
    /// A markup element; its tag selects the serialization wrapper.
    Element {
        tag: String,
        bound: bool,
        attributes: AttrMap,
    },
    Text {
        value: String,
        bound: bool,
    },
    /// Placeholder for a not-yet-expanded embedded template.
    Anchor,
}

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Parent node (None for fragment roots and freshly projected nodes).
    pub parent: Option<NodeId>,
    /// Child node IDs, in document order.
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

/// The arena owning every node of a renderer instance.
///
/// Views built by one renderer share a single tree so that fragments created
/// by one view can be spliced into another view's subtree.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl NodeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                parent: None,
                children: Vec::new(),
                kind,
            },
        );
        id
    }

    /// Create an unattached element node.
    pub fn create_element(
        &mut self,
        tag: impl Into<String>,
        bound: bool,
        attributes: AttrMap,
    ) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.into(),
            bound,
            attributes,
        })
    }

    /// Create an unattached component node.
    pub fn create_component(
        &mut self,
        tag: impl Into<String>,
        bound: bool,
        attributes: AttrMap,
        root: bool,
    ) -> NodeId {
        self.alloc(NodeKind::Component {
            tag: tag.into(),
            bound,
            attributes,
            root,
            projection: ProjectionStore::new(),
        })
    }

    /// Create an unattached text node.
    pub fn create_text(&mut self, value: impl Into<String>, bound: bool) -> NodeId {
        self.alloc(NodeKind::Text {
            value: value.into(),
            bound,
        })
    }

    /// Create an unattached anchor node.
    pub fn create_anchor(&mut self) -> NodeId {
        self.alloc(NodeKind::Anchor)
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Children of a node, empty for unknown IDs.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// True if `id` names a component node.
    pub fn is_component(&self, id: NodeId) -> bool {
        matches!(
            self.get(id),
            Some(Node {
                kind: NodeKind::Component { .. },
                ..
            })
        )
    }

    /// True if `id` names the root component of its build.
    pub fn is_root_component(&self, id: NodeId) -> bool {
        matches!(
            self.get(id),
            Some(Node {
                kind: NodeKind::Component { root: true, .. },
                ..
            })
        )
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        parent_node.children.push(child);
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
    }

    /// Splice `nodes` into `sibling`'s parent immediately after `sibling`,
    /// preserving their relative order.
    ///
    /// Returns false without touching the tree when `sibling` is itself an
    /// unattached root or there is nothing to insert.
    pub fn insert_all_after(&mut self, sibling: NodeId, nodes: &[NodeId]) -> bool {
        if nodes.is_empty() {
            return false;
        }
        let Some(parent_id) = self.parent(sibling) else {
            return false;
        };
        let Some(parent) = self.nodes.get_mut(&parent_id) else {
            return false;
        };
        let Some(mut at) = parent.children.iter().position(|&c| c == sibling) else {
            return false;
        };
        for &node in nodes {
            at += 1;
            parent.children.insert(at, node);
        }
        for &node in nodes {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.parent = Some(parent_id);
            }
        }
        true
    }

    /// Remove `id` from its parent's children and clear the back-reference.
    /// No-op for unattached nodes.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent_id) = self.parent(id) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.children.retain(|&c| c != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
    }

    /// Replace the value of a text node. Returns false for non-text nodes.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(Node {
                kind: NodeKind::Text { value, .. },
                ..
            }) => {
                *value = text.into();
                true
            }
            _ => false,
        }
    }

    /// Set an attribute on an element or component node. Returns false for
    /// text and anchor nodes.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        match self.nodes.get_mut(&id) {
            Some(Node {
                kind:
                    NodeKind::Element { attributes, .. } | NodeKind::Component { attributes, .. },
                ..
            }) => {
                attributes.insert(name.into(), value.into());
                true
            }
            _ => false,
        }
    }

    /// Look up an attribute on an element or component node.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.get(id) {
            Some(Node {
                kind:
                    NodeKind::Element { attributes, .. } | NodeKind::Component { attributes, .. },
                ..
            }) => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Route `node` into `component`'s projection bucket for `slot`.
    /// No-op when `component` is not a component node.
    pub fn add_content_node(&mut self, component: NodeId, slot: usize, node: NodeId) {
        if let Some(Node {
            kind: NodeKind::Component { projection, .. },
            ..
        }) = self.nodes.get_mut(&component)
        {
            projection.add_content_node(slot, node);
        }
    }

    /// The nodes projected into `component`'s bucket for `slot`, empty for
    /// out-of-range slots and non-component nodes.
    pub fn project(&self, component: NodeId, slot: usize) -> &[NodeId] {
        match self.get(component) {
            Some(Node {
                kind: NodeKind::Component { projection, .. },
                ..
            }) => projection.project(slot),
            _ => &[],
        }
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
