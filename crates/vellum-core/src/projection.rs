//! Content projection buckets.

use smallvec::SmallVec;

use crate::tree::NodeId;

/// Per-component store routing projected children to content-slot indices.
///
/// Buckets are append-only during a build: once the owning component's own
/// template has been interpreted, projected nodes already live in the host
/// tree and the store is not consulted again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionStore {
    buckets: Vec<SmallVec<[NodeId; 4]>>,
}

impl ProjectionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self { buckets: Vec::new() }
    }

    /// Append a node to the bucket for `slot`, growing with empty buckets as
    /// needed. Slot indices are not required to arrive contiguous or ascending.
    pub fn add_content_node(&mut self, slot: usize, node: NodeId) {
        while self.buckets.len() <= slot {
            self.buckets.push(SmallVec::new());
        }
        self.buckets[slot].push(node);
    }

    /// The nodes projected into `slot`, in projection order.
    ///
    /// An out-of-range slot is legal and yields an empty slice.
    pub fn project(&self, slot: usize) -> &[NodeId] {
        self.buckets.get(slot).map_or(&[], |bucket| bucket.as_slice())
    }

    /// Number of buckets allocated so far.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True if no node has been projected yet.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.is_empty())
    }
}
