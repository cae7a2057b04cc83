//! Views and the handles the host addresses them by.

use vellum_builder::BuildOutput;
use vellum_core::NodeId;

/// Handle to a view owned by a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewRef(pub usize);

/// Handle to one fragment of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentRef {
    pub view: ViewRef,
    pub fragment: usize,
}

/// Handle to a bound element (or component, or anchor) of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub view: ViewRef,
    pub index: usize,
}

/// A built view: its fragment root lists and the flat bound-node index
/// spaces used to address later mutations.
///
/// Bound indices are assigned once, at build time, and never change; they
/// stay valid across attach/detach operations elsewhere in the tree. The
/// nodes themselves live in the renderer's shared arena.
#[derive(Debug, Clone)]
pub struct View {
    fragments: Vec<Vec<NodeId>>,
    bound_text_nodes: Vec<NodeId>,
    bound_element_nodes: Vec<NodeId>,
    hydrated: bool,
}

impl View {
    /// Wrap a finished build. Views start dehydrated.
    pub fn new(output: BuildOutput) -> Self {
        Self {
            fragments: output.fragments,
            bound_text_nodes: output.bound_text_nodes,
            bound_element_nodes: output.bound_element_nodes,
            hydrated: false,
        }
    }

    /// Root nodes of fragment `index`.
    pub fn fragment(&self, index: usize) -> Option<&[NodeId]> {
        self.fragments.get(index).map(Vec::as_slice)
    }

    /// Number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The bound text node at `index`.
    pub fn bound_text_node(&self, index: usize) -> Option<NodeId> {
        self.bound_text_nodes.get(index).copied()
    }

    /// The bound element node at `index`.
    pub fn bound_element_node(&self, index: usize) -> Option<NodeId> {
        self.bound_element_nodes.get(index).copied()
    }

    /// Hydration state. Hydration has no structural effect.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub(crate) fn set_hydrated(&mut self, hydrated: bool) {
        self.hydrated = hydrated;
    }
}
