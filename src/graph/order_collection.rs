//! An order's items as one flow-graph node collection.
//!
//! The collection cap is the order's `numItems`, so flow through it never
//! exceeds what the order may trade.

use std::ops::{Deref, DerefMut};

use crate::error::GraphError;
use crate::graph::{FlowGraph, NodeCollection, NodeKey};
use crate::orders::{LoadedOrder, Order, OrderItem};

/// The items of one order as flow nodes.
///
/// Each item becomes a node whose capacity is the item's quantity; the
/// collection carries at most the order's `num_items`.
#[derive(Debug, Clone)]
pub struct OrderNodeCollection {
    collection: NodeCollection<Order>,
}

impl OrderNodeCollection {
    /// Add one node per item of `loaded` to `graph`, all with the same role.
    pub fn build(
        graph: &mut FlowGraph<OrderItem>,
        loaded: &LoadedOrder,
        is_sink: bool,
    ) -> Result<Self, GraphError> {
        let mut collection = NodeCollection::new(graph, loaded.order.clone(), loaded.order.num_items());
        for item in &loaded.items {
            let key = graph.add_node(item.clone(), item.max_num_items_contribution(), is_sink);
            collection.add(graph, key)?;
        }
        Ok(Self { collection })
    }

    pub fn order(&self) -> &Order {
        &self.collection.data
    }

    /// Member nodes paired with their items, in item order
    pub fn item_nodes(&self, graph: &FlowGraph<OrderItem>) -> Vec<(NodeKey, OrderItem)> {
        self.collection
            .member_keys(graph)
            .into_iter()
            .filter_map(|key| graph.node(key).map(|node| (key, node.data.clone())))
            .collect()
    }

    /// Whether the order can take part in another unit of flow
    pub fn has_capacity(&self, graph: &FlowGraph<OrderItem>) -> bool {
        self.collection.flow(graph) < self.collection.max_flow()
    }
}

impl Deref for OrderNodeCollection {
    type Target = NodeCollection<Order>;

    fn deref(&self) -> &Self::Target {
        &self.collection
    }
}

impl DerefMut for OrderNodeCollection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.collection
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
