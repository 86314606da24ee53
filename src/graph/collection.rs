//! Insertion-ordered node collections with incremental unit flow.
//!
//! ## Design
//!
//! A `NodeCollection` groups homogeneous nodes of one [`FlowGraph`] under a
//! shared flow cap (`max_flow`). Membership is a doubly-linked list threaded
//! through the nodes themselves, so:
//!
//! - `add` appends at the tail in O(1)
//! - `remove` unlinks from anywhere in O(1) and keeps the relative order of
//!   the remaining members
//!
//! ## Streaming flow
//!
//! [`NodeCollection::stream_flow`] returns a [`FlowStream`]. Each call to
//! `next()` pushes one unit along the first pushable edge of the next member
//! with spare capacity, visiting members round-robin from a cursor stored in
//! the collection. The stream ends once the collection carries `max_flow`
//! units or no member has a pushable edge. Dropping the stream keeps every
//! unit already pushed; a new stream resumes at the saved cursor.

use crate::error::GraphError;
use crate::graph::{CollectionId, EdgeKey, FlowGraph, NodeKey};

/// One step of a [`FlowStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    /// Edge that received the unit
    pub edge: EdgeKey,
    /// Units pushed by this step
    pub flow_pushed: u32,
    /// Units carried by the collection after this step
    pub total_flow_pushed: u32,
}

/// An ordered set of nodes sharing a flow cap.
#[derive(Debug, Clone)]
pub struct NodeCollection<C> {
    /// Value describing the collection as a whole
    pub data: C,

    id: CollectionId,

    /// Maximum units the collection may carry
    max_flow: u32,

    /// First member (slab key)
    head: Option<NodeKey>,

    /// Last member (slab key)
    tail: Option<NodeKey>,

    len: usize,

    /// Member the next flow step starts from; `None` means the head
    cursor: Option<NodeKey>,
}

impl<C> NodeCollection<C> {
    /// Create an empty collection registered with `graph`.
    pub fn new<T>(graph: &mut FlowGraph<T>, data: C, max_flow: u32) -> Self {
        Self {
            data,
            id: graph.allocate_collection_id(),
            max_flow,
            head: None,
            tail: None,
            len: 0,
            cursor: None,
        }
    }

    #[inline]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    #[inline]
    pub fn max_flow(&self) -> u32 {
        self.max_flow
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `key` at the tail.
    ///
    /// # Errors
    ///
    /// Fails if the node is unknown or already a member of any collection.
    pub fn add<T>(&mut self, graph: &mut FlowGraph<T>, key: NodeKey) -> Result<(), GraphError> {
        let tail = self.tail;
        let node = graph.try_node_mut(key)?;
        if let Some(collection) = node.collection {
            return Err(GraphError::AlreadyMember { node: key, collection });
        }
        node.collection = Some(self.id);
        node.prev = tail;
        node.next = None;

        match tail {
            Some(tail_key) => graph.try_node_mut(tail_key)?.next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.len += 1;
        Ok(())
    }

    /// Remove `key` from the collection and unlink all of its edges.
    ///
    /// # Returns
    ///
    /// The units of flow released by unlinking.
    pub fn remove<T>(&mut self, graph: &mut FlowGraph<T>, key: NodeKey) -> Result<u32, GraphError> {
        let node = graph.try_node(key)?;
        if node.collection != Some(self.id) {
            return Err(GraphError::NotMember {
                node: key,
                collection: self.id,
            });
        }
        let (prev, next) = (node.prev, node.next);

        match prev {
            Some(prev_key) => graph.try_node_mut(prev_key)?.next = next,
            None => self.head = next,
        }
        match next {
            Some(next_key) => graph.try_node_mut(next_key)?.prev = prev,
            None => self.tail = prev,
        }
        if self.cursor == Some(key) {
            self.cursor = next;
        }

        let node = graph.try_node_mut(key)?;
        node.collection = None;
        node.prev = None;
        node.next = None;
        self.len -= 1;

        graph.unlink(key)
    }

    pub fn contains<T>(&self, graph: &FlowGraph<T>, key: NodeKey) -> bool {
        graph
            .node(key)
            .is_some_and(|node| node.collection == Some(self.id))
    }

    /// Member keys in insertion order
    pub fn member_keys<T>(&self, graph: &FlowGraph<T>) -> Vec<NodeKey> {
        let mut keys = Vec::with_capacity(self.len);
        let mut current = self.head;
        while let Some(key) = current {
            keys.push(key);
            current = graph.node(key).and_then(|node| node.next);
        }
        keys
    }

    /// Edges leaving members, grouped by member in insertion order
    pub fn outgoing_edges<T>(&self, graph: &FlowGraph<T>) -> Vec<EdgeKey> {
        self.member_edges(graph, |member, from, _| member == from)
    }

    /// Edges entering members, grouped by member in insertion order
    pub fn incoming_edges<T>(&self, graph: &FlowGraph<T>) -> Vec<EdgeKey> {
        self.member_edges(graph, |member, _, to| member == to)
    }

    fn member_edges<T>(
        &self,
        graph: &FlowGraph<T>,
        keep: impl Fn(NodeKey, NodeKey, NodeKey) -> bool,
    ) -> Vec<EdgeKey> {
        let keep = &keep;
        self.member_keys(graph)
            .into_iter()
            .flat_map(|member| {
                graph
                    .edges_of(member)
                    .iter()
                    .copied()
                    .filter(move |key| graph.edge(*key).is_some_and(|e| keep(member, e.from, e.to)))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Units currently carried by the members
    pub fn flow<T>(&self, graph: &FlowGraph<T>) -> u32 {
        self.member_keys(graph)
            .into_iter()
            .filter_map(|key| graph.node(key))
            .map(|node| node.flow())
            .sum()
    }

    /// Start (or resume) pushing unit flow through the members.
    pub fn stream_flow<'a, T>(&'a mut self, graph: &'a mut FlowGraph<T>) -> FlowStream<'a, C, T> {
        FlowStream {
            collection: self,
            graph,
        }
    }

    /// First edge of `member` that can take another unit
    fn pushable_edge<T>(graph: &FlowGraph<T>, member: NodeKey) -> Option<EdgeKey> {
        graph
            .edges_of(member)
            .iter()
            .copied()
            .find(|key| graph.can_push(*key))
    }
}

/// Pull-based flow driver returned by [`NodeCollection::stream_flow`].
///
/// Advancing the iterator mutates the graph.
#[derive(Debug)]
pub struct FlowStream<'a, C, T> {
    collection: &'a mut NodeCollection<C>,
    graph: &'a mut FlowGraph<T>,
}

impl<C, T> FlowStream<'_, C, T> {
    /// Drive the stream to completion and return the final total.
    pub fn saturate(mut self) -> u32 {
        while self.next().is_some() {}
        self.collection.flow(self.graph)
    }
}

impl<C, T> Iterator for FlowStream<'_, C, T> {
    type Item = FlowStep;

    fn next(&mut self) -> Option<FlowStep> {
        let total = self.collection.flow(self.graph);
        if total >= self.collection.max_flow {
            return None;
        }

        let head = self.collection.head?;
        let start = self
            .collection
            .cursor
            .filter(|key| self.collection.contains(self.graph, *key))
            .unwrap_or(head);

        let mut current = start;
        loop {
            let following = self
                .graph
                .node(current)
                .and_then(|node| node.next)
                .unwrap_or(head);

            let has_room = self.graph.node(current).is_some_and(|n| n.has_capacity());
            if has_room {
                if let Some(edge) = NodeCollection::<C>::pushable_edge(self.graph, current) {
                    self.graph.push_unit(edge).ok()?;
                    self.collection.cursor = Some(following);
                    return Some(FlowStep {
                        edge,
                        flow_pushed: 1,
                        total_flow_pushed: total + 1,
                    });
                }
            }

            current = following;
            if current == start {
                return None;
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink collection of `sinks` members, each linked to every one of
    /// `sources` single-capacity source nodes.
    fn bipartite(
        sinks: usize,
        sources: usize,
        max_flow: u32,
    ) -> (FlowGraph<usize>, NodeCollection<&'static str>, Vec<NodeKey>, Vec<NodeKey>) {
        let mut graph = FlowGraph::new();
        let mut collection = NodeCollection::new(&mut graph, "root", max_flow);
        let sink_keys: Vec<_> = (0..sinks).map(|i| graph.add_node(i, 1, true)).collect();
        let source_keys: Vec<_> = (0..sources).map(|i| graph.add_node(100 + i, 1, false)).collect();
        for sink in &sink_keys {
            collection.add(&mut graph, *sink).unwrap();
            for source in &source_keys {
                graph.link(*sink, *source).unwrap();
            }
        }
        (graph, collection, sink_keys, source_keys)
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let (graph, collection, sinks, _) = bipartite(3, 0, 3);
        assert_eq!(collection.len(), 3);
        assert_eq!(collection.member_keys(&graph), sinks);
    }

    #[test]
    fn test_add_rejects_existing_member() {
        let (mut graph, mut collection, sinks, _) = bipartite(1, 0, 1);
        let mut other = NodeCollection::new(&mut graph, "other", 1);

        assert_eq!(
            other.add(&mut graph, sinks[0]),
            Err(GraphError::AlreadyMember {
                node: sinks[0],
                collection: collection.id(),
            })
        );
        assert!(collection.add(&mut graph, sinks[0]).is_err());
    }

    #[test]
    fn test_remove_and_readd_moves_to_end() {
        let (mut graph, mut collection, sinks, _) = bipartite(4, 0, 4);

        collection.remove(&mut graph, sinks[1]).unwrap();
        assert_eq!(collection.member_keys(&graph), vec![sinks[0], sinks[2], sinks[3]]);
        assert!(!collection.contains(&graph, sinks[1]));

        collection.add(&mut graph, sinks[1]).unwrap();
        assert_eq!(
            collection.member_keys(&graph),
            vec![sinks[0], sinks[2], sinks[3], sinks[1]]
        );

        assert_eq!(
            collection.remove(&mut graph, NodeKey(42)),
            Err(GraphError::UnknownNode(NodeKey(42)))
        );
    }

    #[test]
    fn test_edges_grouped_by_member() {
        let (graph, collection, sinks, sources) = bipartite(2, 2, 2);

        let incoming = collection.incoming_edges(&graph);
        assert_eq!(incoming.len(), 4);
        assert!(collection.outgoing_edges(&graph).is_empty());

        let first: Vec<_> = incoming[..2].iter().map(|k| graph.edge(*k).unwrap().to).collect();
        assert_eq!(first, vec![sinks[0], sinks[0]]);
        assert_eq!(graph.edge(incoming[1]).unwrap().from, sources[1]);
    }

    #[test]
    fn test_stream_flow_round_robin_until_cap() {
        let (mut graph, mut collection, sinks, sources) = bipartite(3, 3, 2);

        let steps: Vec<FlowStep> = collection.stream_flow(&mut graph).collect();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].total_flow_pushed, 1);
        assert_eq!(steps[1].total_flow_pushed, 2);

        // First member takes the first source, second member the next free one
        let e0 = graph.edge(steps[0].edge).unwrap();
        let e1 = graph.edge(steps[1].edge).unwrap();
        assert_eq!((e0.to, e0.from), (sinks[0], sources[0]));
        assert_eq!((e1.to, e1.from), (sinks[1], sources[1]));

        assert_eq!(collection.flow(&graph), 2);
        assert!(collection.stream_flow(&mut graph).next().is_none());
    }

    #[test]
    fn test_stream_flow_stops_when_sources_run_out() {
        let (mut graph, mut collection, _, _) = bipartite(3, 1, 3);
        assert_eq!(collection.stream_flow(&mut graph).saturate(), 1);
    }

    #[test]
    fn test_new_member_picked_up_without_restart() {
        let (mut graph, mut collection, _, sources) = bipartite(1, 1, 2);
        assert_eq!(collection.stream_flow(&mut graph).count(), 1);

        let late = graph.add_node(9, 1, true);
        let extra_source = graph.add_node(200, 1, false);
        collection.add(&mut graph, late).unwrap();
        graph.link(late, sources[0]).unwrap();
        graph.link(late, extra_source).unwrap();

        let step = collection.stream_flow(&mut graph).next().unwrap();
        assert_eq!(step.total_flow_pushed, 2);
        assert_eq!(graph.edge(step.edge).unwrap().from, extra_source);
    }

    #[test]
    fn test_removal_frees_flow_for_others() {
        let (mut graph, mut collection, sinks, _) = bipartite(2, 1, 2);
        assert_eq!(collection.stream_flow(&mut graph).saturate(), 1);

        // The single source is held by the first sink; removing it frees the unit
        assert_eq!(collection.remove(&mut graph, sinks[0]).unwrap(), 1);
        assert_eq!(collection.flow(&graph), 0);

        let step = collection.stream_flow(&mut graph).next().unwrap();
        assert_eq!(graph.edge(step.edge).unwrap().to, sinks[1]);
        assert_eq!(step.total_flow_pushed, 1);
    }
}
