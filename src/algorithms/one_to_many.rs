//! One-to-many fills through unit flow.
//!
//! ## Network
//!
//! ```text
//! candidate item (source, cap 1) ──edge──▶ root item (sink, cap = quantity)
//!                                          └── root collection, cap = numItems
//! ```
//!
//! Candidates are linked best-first: by their own price at the earliest
//! moment they overlap a root item they satisfy, then earliest moment, then
//! token-pinned before open, then order id. The round-robin stream over the
//! root items hands each item the best counterparty still free, and an open
//! candidate reaches an item only after the pinned ones that could fill it.
//! Every flowed edge becomes one `(root item, opposing item)` pair of a
//! single record; the record is only emitted when the flow fills the whole
//! root order and the bundle price crosses.

use tracing::{debug, error, info_span, warn};

use crate::algorithms::one_to_one::rank;
use crate::error::Result;
use crate::graph::{FlowGraph, NodeKey, OrderNodeCollection};
use crate::orders::{LoadedOrder, OrderItem};
use crate::types::price::{format_eth, Intersection};
use crate::types::{OneToManyMatch, OrderItemData};

/// One-to-many search over a root order and its candidates.
#[derive(Debug, Clone)]
pub struct OneToManySearch {
    root: LoadedOrder,
    candidates: Vec<LoadedOrder>,
}

impl OneToManySearch {
    pub fn new(root: LoadedOrder, candidates: Vec<LoadedOrder>) -> Self {
        Self { root, candidates }
    }

    /// Run the search. Unmet preconditions and internal failures yield no
    /// matches.
    pub fn search(&self) -> Vec<OneToManyMatch> {
        let span = info_span!("one_to_many", root_order = %self.root.id());
        let _guard = span.enter();

        match self.try_search() {
            Ok(matches) => matches,
            Err(err) => {
                error!(error = %err, "one-to-many search failed");
                Vec::new()
            }
        }
    }

    fn try_search(&self) -> Result<Vec<OneToManyMatch>> {
        let num_items = self.root.order.num_items();
        if num_items <= 1 {
            debug!(num_items, "root is not a multi-item order");
            return Ok(Vec::new());
        }
        if !self.root.is_fully_specified() {
            debug!("root order is not fully specified");
            return Ok(Vec::new());
        }

        let mut graph: FlowGraph<OrderItem> = FlowGraph::new();
        let mut root = OrderNodeCollection::build(&mut graph, &self.root, true)?;
        let root_nodes = root.item_nodes(&graph);
        let side = self.root.order.data().side();

        let mut ranked: Vec<(Intersection, &LoadedOrder)> = self
            .candidates
            .iter()
            .filter(|c| c.order.num_items() == 1)
            .filter_map(|c| {
                c.items
                    .iter()
                    .flat_map(|item| {
                        root_nodes
                            .iter()
                            .filter(move |(_, r)| r.is_match(item.data()).is_valid)
                            .filter_map(move |(_, r)| standing(r.data(), item.data()))
                    })
                    .min_by(|a, b| rank(side, a, b))
                    .map(|cross| (cross, c))
            })
            .collect();
        ranked.sort_by(|(a, ca), (b, cb)| {
            rank(side, a, b)
                .then_with(|| is_open(ca).cmp(&is_open(cb)))
                .then_with(|| ca.id().cmp(cb.id()))
        });

        for (_, candidate) in &ranked {
            let collection = OrderNodeCollection::build(&mut graph, candidate, false)?;
            for (candidate_key, candidate_item) in collection.item_nodes(&graph) {
                for (root_key, root_item) in &root_nodes {
                    if root_item.is_match(candidate_item.data()).is_valid {
                        graph.link(*root_key, candidate_key)?;
                    }
                }
            }
        }

        let total = root.stream_flow(&mut graph).saturate();
        if total < num_items {
            debug!(total, num_items, candidates = ranked.len(), "bundle not filled");
            return Ok(Vec::new());
        }

        let pairs = flowed_pairs(&graph, &root_nodes)?;
        for (root_key, root_item) in &root_nodes {
            let opposing: Vec<_> = pairs
                .iter()
                .filter(|(key, _, _)| key == root_key)
                .map(|(_, _, o)| o.data().clone())
                .collect();
            if !root_item.are_matches(&opposing).is_valid() {
                warn!(item = %root_item.id(), "flowed bundle rejected for item");
                return Ok(Vec::new());
            }
        }

        let pairs: Vec<(OrderItem, OrderItem)> = pairs.into_iter().map(|(_, r, o)| (r, o)).collect();
        match self.root.order.one_to_many_record(&pairs) {
            Some(record) => {
                debug!(
                    items = record.num_items(),
                    price = %format_eth(record.price),
                    timestamp = record.timestamp,
                    "bundle filled"
                );
                Ok(vec![record])
            }
            None => {
                debug!("bundle price curves never cross");
                Ok(Vec::new())
            }
        }
    }
}

/// The candidate's own price at the first moment both windows are open.
fn standing(root: &OrderItemData, candidate: &OrderItemData) -> Option<Intersection> {
    let start = root.start_time_ms.max(candidate.start_time_ms);
    let end = root.end_time_ms.min(candidate.end_time_ms);
    (start <= end).then(|| Intersection {
        price: candidate.price_ramp().price_at(start),
        timestamp: start,
    })
}

/// Whether any item of `candidate` accepts any token of its collection
fn is_open(candidate: &LoadedOrder) -> bool {
    candidate.items.iter().any(|item| !item.data().has_token_id())
}

/// `(root key, root item, opposing item)` for every edge carrying flow, in
/// root item order then link order.
fn flowed_pairs(
    graph: &FlowGraph<OrderItem>,
    root_nodes: &[(NodeKey, OrderItem)],
) -> Result<Vec<(NodeKey, OrderItem, OrderItem)>> {
    let mut pairs = Vec::new();
    for (root_key, root_item) in root_nodes {
        for edge_key in graph.edges_of(*root_key) {
            let edge = graph.try_edge(*edge_key)?;
            if edge.flow() == 0 {
                continue;
            }
            let opposing = graph.try_node(edge.from)?.data.clone();
            pairs.push((*root_key, root_item.clone(), opposing));
        }
    }
    Ok(pairs)
}

// ============================================================================
// Unit Tests
// ============================================================================
