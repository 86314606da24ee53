//! Flow-graph node for slab-based storage.
//!
//! ## Design
//!
//! `Node<T>` wraps a value with a unit capacity, a source/sink role and the
//! current flow through it. Edges are referenced by slab key, never by
//! pointer.
//!
//! ## Membership list
//!
//! Members of one [`NodeCollection`](crate::graph::NodeCollection) form a
//! doubly-linked list through `next`/`prev`, in insertion order:
//!
//! ```text
//! head (first added) <-> node <-> node <-> tail (last added)
//! ```
//!
//! so a member can be removed in O(1) without disturbing the others.

use crate::graph::{CollectionId, EdgeKey, NodeKey};

/// Node stored in the graph arena.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The wrapped value
    pub data: T,

    /// Maximum units of flow through this node
    pub(crate) capacity: u32,

    /// Units currently flowing through this node
    pub(crate) flow: u32,

    /// Sink-side (`true`) or source-side (`false`)
    pub(crate) is_sink: bool,

    /// Linked edges, in link order
    pub(crate) edges: Vec<EdgeKey>,

    /// Collection this node belongs to, if any
    pub(crate) collection: Option<CollectionId>,

    /// Next member of the collection (slab key)
    pub(crate) next: Option<NodeKey>,

    /// Previous member of the collection (slab key)
    pub(crate) prev: Option<NodeKey>,
}

impl<T> Node<T> {
    /// Create a node with no edges and no flow.
    ///
    /// # Arguments
    ///
    /// * `data` - The value to wrap
    /// * `capacity` - Maximum concurrent units of flow
    /// * `is_sink` - Role of the node; edges always run source to sink
    ///
    /// # Example
    ///
    /// ```
    /// use nft_flow_match::graph::Node;
    ///
    /// let node = Node::new("item", 2, true);
    /// assert_eq!(node.capacity(), 2);
    /// assert_eq!(node.flow(), 0);
    /// assert!(node.has_capacity());
    /// ```
    pub fn new(data: T, capacity: u32, is_sink: bool) -> Self {
        Self {
            data,
            capacity,
            flow: 0,
            is_sink,
            edges: Vec::new(),
            collection: None,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn flow(&self) -> u32 {
        self.flow
    }

    #[inline]
    pub fn is_sink(&self) -> bool {
        self.is_sink
    }

    /// Whether another unit of flow fits through this node
    #[inline]
    pub fn has_capacity(&self) -> bool {
        self.flow < self.capacity
    }

    #[inline]
    pub fn edges(&self) -> &[EdgeKey] {
        &self.edges
    }

    #[inline]
    pub fn collection(&self) -> Option<CollectionId> {
        self.collection
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new() {
        let node = Node::new(7u32, 1, false);

        assert_eq!(node.data, 7);
        assert!(!node.is_sink());
        assert!(node.edges().is_empty());
        assert!(node.collection().is_none());
        assert!(node.next.is_none() && node.prev.is_none());
    }

    #[test]
    fn test_zero_capacity_node_is_full() {
        let node = Node::new((), 0, true);
        assert!(!node.has_capacity());
    }
}
