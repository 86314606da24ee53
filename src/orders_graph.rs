//! Per-order search orchestration.
//!
//! ## Flow
//!
//! ```text
//! root items ──possible_matches──▶ candidate docs ──dedupe by order──▶ get_order
//!     ──order_items──▶ is_match filter ──▶ OneToOneSearch + OneToManySearch
//! ```
//!
//! Store failures propagate; everything the algorithms reject is logged and
//! dropped.

use std::collections::HashSet;
use std::sync::Arc;

use futures::TryStreamExt;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::algorithms::{OneToManySearch, OneToOneSearch};
use crate::config::MatchingConfig;
use crate::constraints::ConstraintChain;
use crate::error::{MatchError, Result};
use crate::orders::{LoadedOrder, Order};
use crate::store::{OrderStore, StoreError};
use crate::types::{MatchRecord, OrderData, OrderItemData};

/// Output of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub matches: Vec<MatchRecord>,
    /// Multi-item opposing orders met while matching a single-item root
    pub requires_scan: Vec<OrderData>,
}

/// Wires the matching pipeline together for one root order.
#[derive(Debug, Clone)]
pub struct OrdersGraph {
    root: Order,
    chain: Arc<ConstraintChain>,
    store: Arc<dyn OrderStore>,
    config: MatchingConfig,
}

impl OrdersGraph {
    /// Search for `root` with the standard chain and default config.
    pub fn new(root: OrderData, store: Arc<dyn OrderStore>) -> Self {
        let chain = Arc::new(ConstraintChain::standard());
        Self {
            root: Order::with_chain(root, Arc::clone(&chain), Arc::clone(&store)),
            chain,
            store,
            config: MatchingConfig::default(),
        }
    }

    /// Read the root order from the store.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no order has this id.
    pub async fn load(order_id: &str, store: Arc<dyn OrderStore>, config: MatchingConfig) -> Result<Self> {
        let data = store
            .get_order(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))?;
        Ok(Self::new(data, store).with_config(config))
    }

    pub fn with_config(mut self, config: MatchingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Order {
        &self.root
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Find matches for the root order.
    ///
    /// # Arguments
    ///
    /// * `possible_matches` - Candidate item documents; when `None` they are
    ///   enumerated through each root item's constraint chain
    ///
    /// # Errors
    ///
    /// Store failures and a structurally invalid root order. Invalid or
    /// vanished candidate orders are skipped.
    #[instrument(skip_all, fields(root_order = %self.root.id()))]
    pub async fn search(&self, possible_matches: Option<Vec<OrderItemData>>) -> Result<SearchResult> {
        let root = LoadedOrder::load(self.root.clone()).await?;
        let docs = match possible_matches {
            Some(docs) => docs,
            None => self.enumerate(&root).await?,
        };

        let mut seen = HashSet::new();
        let mut order_ids: Vec<String> = docs
            .iter()
            .filter(|doc| doc.order_id != root.id())
            .filter(|doc| seen.insert(doc.order_id.clone()))
            .map(|doc| doc.order_id.clone())
            .collect();
        if let Some(cap) = self.config.max_candidate_orders {
            if order_ids.len() > cap {
                debug!(found = order_ids.len(), cap, "capping candidate orders");
                order_ids.truncate(cap);
            }
        }

        let mut candidates = Vec::with_capacity(order_ids.len());
        let mut requires_scan = Vec::new();
        let mut rejected = 0usize;

        for order_id in &order_ids {
            let Some(data) = self.store.get_order(order_id).await? else {
                warn!(order_id = %order_id, "candidate order no longer exists");
                rejected += 1;
                continue;
            };
            let order = Order::with_chain(data, Arc::clone(&self.chain), Arc::clone(&self.store));
            let loaded = match LoadedOrder::load(order).await {
                Ok(loaded) => loaded,
                Err(err @ MatchError::InvalidOrder { .. }) => {
                    warn!(error = %err, "skipping invalid candidate order");
                    rejected += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let compatible = loaded
                .items
                .iter()
                .any(|item| root.items.iter().any(|r| r.is_match(item.data()).is_valid));
            if !compatible {
                debug!(order_id = %order_id, "candidate rejected by constraint chain");
                rejected += 1;
                continue;
            }

            if root.order.num_items() == 1 && loaded.order.num_items() > 1 {
                requires_scan.push(loaded.order.data().clone());
                continue;
            }
            candidates.push(loaded);
        }

        let mut matches: Vec<MatchRecord> = Vec::new();
        if self.config.one_to_one {
            let found = OneToOneSearch::new(root.clone(), candidates.clone()).search();
            matches.extend(found.into_iter().map(MatchRecord::from));
        }
        if self.config.one_to_many {
            let found = OneToManySearch::new(root, candidates.clone()).search();
            matches.extend(found.into_iter().map(MatchRecord::from));
        }

        info!(
            candidate_docs = docs.len(),
            candidate_orders = candidates.len(),
            rejected,
            matches = matches.len(),
            requires_scan = requires_scan.len(),
            "search complete"
        );
        Ok(SearchResult {
            matches,
            requires_scan,
        })
    }

    /// Drain every root item's candidate stream.
    async fn enumerate(&self, root: &LoadedOrder) -> Result<Vec<OrderItemData>> {
        let mut docs = Vec::new();
        for item in &root.items {
            let page: Vec<OrderItemData> = item.possible_matches(self.config.page_size).try_collect().await?;
            debug!(item = %item.id(), found = page.len(), "enumerated candidates");
            docs.extend(page);
        }
        Ok(docs)
    }
}
