//! Unit-capacity flow graph.
//!
//! ## Architecture
//!
//! - [`FlowGraph`]: slab arena of [`Node`]s and [`Edge`]s addressed by
//!   [`NodeKey`] / [`EdgeKey`]
//! - [`NodeCollection`]: insertion-ordered set of nodes with a shared flow
//!   cap and a resumable [`FlowStream`]
//! - [`OrderNodeCollection`]: a collection whose members are the items of
//!   one order
//!
//! ## Invariants
//!
//! - every edge runs from a source node to a sink node and carries 0 or 1
//! - a node's flow never exceeds its capacity
//! - a collection's flow never exceeds its `max_flow` through streaming

use std::fmt;

use serde::Serialize;

mod collection;
mod edge;
mod flow_graph;
mod node;
mod order_collection;

pub use collection::{FlowStep, FlowStream, NodeCollection};
pub use edge::Edge;
pub use flow_graph::FlowGraph;
pub use node::Node;
pub use order_collection::OrderNodeCollection;

/// Slab key of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey(pub usize);

/// Slab key of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeKey(pub usize);

/// Identifier of a node collection within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CollectionId(pub u64);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection#{}", self.0)
    }
}
