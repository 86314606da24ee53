//! Greedy one-to-one pairing.
//!
//! The root order must hold exactly one NFT. Every candidate order holding
//! exactly one NFT whose item passes the chain becomes an edge to the root
//! item; edges are taken best agreed price first, then earliest agreed
//! timestamp, then the counterparty's own price, then candidate order id. A
//! candidate order and a root item are each used at most once.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::{debug, error, info_span};

use crate::error::Result;
use crate::graph::{EdgeKey, FlowGraph, OrderNodeCollection};
use crate::orders::{LoadedOrder, OrderItem};
use crate::types::price::{format_eth, Intersection};
use crate::types::{OneToOneMatch, Side};

/// One-to-one search over a root order and its candidates.
#[derive(Debug, Clone)]
pub struct OneToOneSearch {
    root: LoadedOrder,
    candidates: Vec<LoadedOrder>,
}

struct RankedEdge {
    edge: EdgeKey,
    candidate: usize,
    cross: Intersection,
    /// Opposing price at the agreed timestamp
    opposing_price: Decimal,
}

impl OneToOneSearch {
    pub fn new(root: LoadedOrder, candidates: Vec<LoadedOrder>) -> Self {
        Self { root, candidates }
    }

    /// Run the search. Internal failures are logged and yield no matches.
    pub fn search(&self) -> Vec<OneToOneMatch> {
        let span = info_span!("one_to_one", root_order = %self.root.id());
        let _guard = span.enter();

        match self.try_search() {
            Ok(matches) => matches,
            Err(err) => {
                error!(error = %err, "one-to-one search failed");
                Vec::new()
            }
        }
    }

    fn try_search(&self) -> Result<Vec<OneToOneMatch>> {
        if self.root.order.num_items() != 1 {
            debug!(num_items = self.root.order.num_items(), "root is not a single-item order");
            return Ok(Vec::new());
        }

        let mut graph: FlowGraph<OrderItem> = FlowGraph::with_capacity(self.candidates.len() + 1, self.candidates.len());
        let root = OrderNodeCollection::build(&mut graph, &self.root, true)?;
        let root_side = self.root.order.data().side();

        let root_nodes = root.item_nodes(&graph);

        let mut collections = Vec::with_capacity(self.candidates.len());
        let mut ranked = Vec::new();
        for candidate in &self.candidates {
            if candidate.order.num_items() != 1 {
                continue;
            }
            let collection = OrderNodeCollection::build(&mut graph, candidate, false)?;
            let index = collections.len();

            for (candidate_key, candidate_item) in collection.item_nodes(&graph) {
                for (root_key, root_item) in &root_nodes {
                    if !root_item.is_match(candidate_item.data()).is_valid {
                        continue;
                    }
                    let Some(cross) = root_item.data().intersection_with(candidate_item.data()) else {
                        continue;
                    };
                    let edge = graph.link(*root_key, candidate_key)?;
                    ranked.push(RankedEdge {
                        edge,
                        candidate: index,
                        cross,
                        opposing_price: candidate_item.data().price_ramp().price_at(cross.timestamp),
                    });
                }
            }
            collections.push(collection);
        }

        // Agreed price, then timestamp, then the counterparty's own price
        ranked.sort_by(|a, b| {
            rank(root_side, &a.cross, &b.cross)
                .then_with(|| match root_side {
                    Side::Sell => b.opposing_price.cmp(&a.opposing_price),
                    Side::Buy => a.opposing_price.cmp(&b.opposing_price),
                })
                .then_with(|| collections[a.candidate].order().id().cmp(collections[b.candidate].order().id()))
        });

        let mut matches = Vec::new();
        for entry in ranked {
            if !root.has_capacity(&graph) {
                break;
            }
            if !collections[entry.candidate].has_capacity(&graph) || !graph.can_push(entry.edge) {
                continue;
            }
            graph.push_unit(entry.edge)?;

            let edge = *graph.try_edge(entry.edge)?;
            let root_item = &graph.try_node(edge.to)?.data;
            let candidate_item = &graph.try_node(edge.from)?.data;
            debug!(
                opposing_order = %candidate_item.data().order_id,
                price = %format_eth(entry.cross.price),
                timestamp = entry.cross.timestamp,
                "paired"
            );
            matches.push(root.order().one_to_one_record(root_item, candidate_item, entry.cross));
        }

        Ok(matches)
    }
}

/// Better crossing first for a root on `side`: a listing wants the highest
/// price, an offer the lowest; ties go to the earlier timestamp.
pub(crate) fn rank(side: Side, a: &Intersection, b: &Intersection) -> Ordering {
    let by_price = match side {
        Side::Sell => b.price.cmp(&a.price),
        Side::Buy => a.price.cmp(&b.price),
    };
    by_price.then_with(|| a.timestamp.cmp(&b.timestamp))
}

// ============================================================================
// Unit Tests
// ============================================================================
