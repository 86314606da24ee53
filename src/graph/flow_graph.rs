//! Arena holding every node and edge of one search.
//!
//! ## Slab Integration
//!
//! Nodes and edges live in two [`Slab`]s and refer to each other by key:
//! - O(1) insert, lookup and removal
//! - no reference cycles between nodes and edges
//! - unlinking a node clears its adjacency list; the node itself stays
//!
//! One graph is built per search call and dropped afterwards.

use slab::Slab;

use crate::error::GraphError;
use crate::graph::{CollectionId, Edge, EdgeKey, Node, NodeKey};

/// Unit-capacity directed flow graph.
#[derive(Debug)]
pub struct FlowGraph<T> {
    nodes: Slab<Node<T>>,
    edges: Slab<Edge>,
    next_collection_id: u64,
}

impl<T> FlowGraph<T> {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a graph with pre-allocated arenas
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(nodes),
            edges: Slab::with_capacity(edges),
            next_collection_id: 0,
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Insert a new unlinked node and return its key.
    pub fn add_node(&mut self, data: T, capacity: u32, is_sink: bool) -> NodeKey {
        NodeKey(self.nodes.insert(Node::new(data, capacity, is_sink)))
    }

    #[inline]
    pub fn node(&self, key: NodeKey) -> Option<&Node<T>> {
        self.nodes.get(key.0)
    }

    #[inline]
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node<T>> {
        self.nodes.get_mut(key.0)
    }

    pub(crate) fn try_node(&self, key: NodeKey) -> Result<&Node<T>, GraphError> {
        self.node(key).ok_or(GraphError::UnknownNode(key))
    }

    pub(crate) fn try_node_mut(&mut self, key: NodeKey) -> Result<&mut Node<T>, GraphError> {
        self.node_mut(key).ok_or(GraphError::UnknownNode(key))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ========================================================================
    // Edges
    // ========================================================================

    #[inline]
    pub fn edge(&self, key: EdgeKey) -> Option<&Edge> {
        self.edges.get(key.0)
    }

    pub(crate) fn try_edge(&self, key: EdgeKey) -> Result<&Edge, GraphError> {
        self.edge(key).ok_or(GraphError::UnknownEdge(key))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges of `node` in link order (empty for unknown keys)
    pub fn edges_of(&self, node: NodeKey) -> &[EdgeKey] {
        self.node(node).map(|n| n.edges()).unwrap_or_default()
    }

    /// Connect a source node to a sink node with a fresh zero-flow edge.
    ///
    /// The arguments may be given in either order; the edge is always
    /// oriented source to sink.
    ///
    /// # Errors
    ///
    /// * [`GraphError::UnknownNode`] - either key is not in the graph
    /// * [`GraphError::SameRole`] - both nodes are sources or both sinks
    /// * [`GraphError::AlreadyLinked`] - an edge between them already exists
    pub fn link(&mut self, a: NodeKey, b: NodeKey) -> Result<EdgeKey, GraphError> {
        let a_is_sink = self.try_node(a)?.is_sink;
        let b_is_sink = self.try_node(b)?.is_sink;
        if a_is_sink == b_is_sink {
            return Err(GraphError::SameRole(a, b));
        }
        let (from, to) = if a_is_sink { (b, a) } else { (a, b) };

        let exists = self
            .try_node(from)?
            .edges
            .iter()
            .filter_map(|key| self.edge(*key))
            .any(|edge| edge.to == to);
        if exists {
            return Err(GraphError::AlreadyLinked(from, to));
        }

        let key = EdgeKey(self.edges.insert(Edge::new(from, to)));
        self.try_node_mut(from)?.edges.push(key);
        self.try_node_mut(to)?.edges.push(key);
        Ok(key)
    }

    /// Remove every edge of `node` from both endpoints.
    ///
    /// Flow carried by those edges is released on both sides.
    ///
    /// # Returns
    ///
    /// The units of flow that were released.
    pub fn unlink(&mut self, node: NodeKey) -> Result<u32, GraphError> {
        let edges = std::mem::take(&mut self.try_node_mut(node)?.edges);
        let mut released = 0;

        for key in edges {
            let edge = self.edges.try_remove(key.0).ok_or(GraphError::UnknownEdge(key))?;
            let other = edge.other(node).ok_or(GraphError::UnknownEdge(key))?;

            let peer = self.try_node_mut(other)?;
            peer.edges.retain(|k| *k != key);
            peer.flow -= edge.flow;

            self.try_node_mut(node)?.flow -= edge.flow;
            released += edge.flow;
        }

        Ok(released)
    }

    // ========================================================================
    // Flow
    // ========================================================================

    /// Whether one more unit fits along `edge`: the edge is empty and both
    /// endpoints have spare capacity.
    pub fn can_push(&self, edge: EdgeKey) -> bool {
        let Some(e) = self.edge(edge) else {
            return false;
        };
        let has_room = |key| self.node(key).is_some_and(|n| n.has_capacity());
        !e.is_saturated() && has_room(e.from) && has_room(e.to)
    }

    /// Push one unit of flow along `edge`.
    pub fn push_unit(&mut self, edge: EdgeKey) -> Result<(), GraphError> {
        if !self.can_push(edge) {
            return Err(GraphError::Saturated(edge));
        }
        let (from, to) = {
            let e = self.edges.get_mut(edge.0).ok_or(GraphError::UnknownEdge(edge))?;
            e.flow += 1;
            (e.from, e.to)
        };
        self.try_node_mut(from)?.flow += 1;
        self.try_node_mut(to)?.flow += 1;
        Ok(())
    }

    /// Edges currently carrying flow, in slab order
    pub fn flowing_edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> + '_ {
        self.edges
            .iter()
            .filter(|(_, e)| e.flow > 0)
            .map(|(k, e)| (EdgeKey(k), e))
    }

    pub(crate) fn allocate_collection_id(&mut self) -> CollectionId {
        let id = CollectionId(self.next_collection_id);
        self.next_collection_id += 1;
        id
    }
}

impl<T> Default for FlowGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(graph: &mut FlowGraph<&'static str>) -> (NodeKey, NodeKey) {
        let source = graph.add_node("offer", 1, false);
        let sink = graph.add_node("listing", 1, true);
        (source, sink)
    }

    #[test]
    fn test_link_orients_source_to_sink() {
        let mut graph = FlowGraph::new();
        let (source, sink) = pair(&mut graph);

        let key = graph.link(sink, source).unwrap();
        let edge = graph.edge(key).unwrap();
        assert_eq!(edge.from, source);
        assert_eq!(edge.to, sink);
        assert_eq!(edge.flow(), 0);
        assert_eq!(graph.edges_of(source), &[key]);
        assert_eq!(graph.edges_of(sink), &[key]);
    }

    #[test]
    fn test_link_rejects_same_role_and_duplicates() {
        let mut graph = FlowGraph::new();
        let (source, sink) = pair(&mut graph);
        let other_source = graph.add_node("offer-2", 1, false);

        assert_eq!(
            graph.link(source, other_source),
            Err(GraphError::SameRole(source, other_source))
        );
        graph.link(source, sink).unwrap();
        assert_eq!(
            graph.link(source, sink),
            Err(GraphError::AlreadyLinked(source, sink))
        );
        assert_eq!(
            graph.link(source, NodeKey(99)),
            Err(GraphError::UnknownNode(NodeKey(99)))
        );
    }

    #[test]
    fn test_push_respects_edge_and_node_capacity() {
        let mut graph = FlowGraph::new();
        let (source, sink) = pair(&mut graph);
        let sink_b = graph.add_node("listing-2", 1, true);
        let e1 = graph.link(source, sink).unwrap();
        let e2 = graph.link(source, sink_b).unwrap();

        graph.push_unit(e1).unwrap();
        assert_eq!(graph.edge(e1).unwrap().flow(), 1);
        assert_eq!(graph.push_unit(e1), Err(GraphError::Saturated(e1)));

        // Source capacity 1 is used up
        assert!(!graph.can_push(e2));
        assert_eq!(graph.node(source).unwrap().flow(), 1);
        assert_eq!(graph.node(sink).unwrap().flow(), 1);
    }

    #[test]
    fn test_unlink_releases_flow() {
        let mut graph = FlowGraph::new();
        let (source, sink) = pair(&mut graph);
        let sink_b = graph.add_node("listing-2", 1, true);
        let e1 = graph.link(source, sink).unwrap();
        let e2 = graph.link(source, sink_b).unwrap();
        graph.push_unit(e1).unwrap();

        assert_eq!(graph.unlink(sink).unwrap(), 1);
        assert!(graph.edge(e1).is_none());
        assert!(graph.edges_of(sink).is_empty());
        assert_eq!(graph.edges_of(source), &[e2]);
        assert_eq!(graph.node(source).unwrap().flow(), 0);
        assert!(graph.can_push(e2));

        // Node stays in the arena
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
    }
}
