//! Unit-capacity edges between a source node and a sink node.

use serde::Serialize;

use crate::graph::NodeKey;

/// Directed link from a source node to a sink node.
///
/// Carries at most one unit of flow: one NFT moving between two order items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub(crate) flow: u32,
}

impl Edge {
    /// Unit capacity of every edge
    pub const CAPACITY: u32 = 1;

    pub(crate) fn new(from: NodeKey, to: NodeKey) -> Self {
        Self { from, to, flow: 0 }
    }

    #[inline]
    pub fn flow(&self) -> u32 {
        self.flow
    }

    #[inline]
    pub fn is_saturated(&self) -> bool {
        self.flow >= Self::CAPACITY
    }

    /// The endpoint opposite `node`, if `node` is an endpoint
    pub fn other(&self, node: NodeKey) -> Option<NodeKey> {
        if node == self.from {
            Some(self.to)
        } else if node == self.to {
            Some(self.from)
        } else {
            None
        }
    }
}
