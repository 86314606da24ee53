//! Match-search algorithms.
//!
//! ## Modes
//!
//! - [`OneToOneSearch`]: single-item root against single-item candidates,
//!   greedy best-price pairing
//! - [`OneToManySearch`]: fully specified multi-item root filled by
//!   single-item candidates through unit flow
//!
//! Both build their own [`FlowGraph`](crate::graph::FlowGraph) per call, run
//! synchronously, and never fail: unmet preconditions and internal errors
//! are logged and produce an empty result.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run(root: nft_flow_match::orders::LoadedOrder, candidates: Vec<nft_flow_match::orders::LoadedOrder>) {
//! use nft_flow_match::algorithms::{OneToManySearch, OneToOneSearch};
//!
//! let pairs = OneToOneSearch::new(root.clone(), candidates.clone()).search();
//! let bundles = OneToManySearch::new(root, candidates).search();
//! # }
//! ```

mod one_to_many;
mod one_to_one;

pub use one_to_many::OneToManySearch;
pub use one_to_one::OneToOneSearch;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::constraints::fixtures::order;
    use crate::orders::{LoadedOrder, Order};
    use crate::store::MemoryOrderStore;
    use crate::types::OrderItemData;

    /// Order with one item per entry of `tokens`, each of quantity 1.
    pub fn bundle(id: &str, is_sell: bool, tokens: &[Option<&str>], price: Decimal) -> LoadedOrder {
        let mut data = order(id, is_sell, price);
        data.num_items = tokens.len() as u32;
        let items = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| OrderItemData::for_order(&data, format!("{id}-{i}"), "0xcoll", t.map(String::from), 1))
            .collect();

        let order = Order::new(data, Arc::new(MemoryOrderStore::new()));
        let items = order.bind_items(items).unwrap();
        LoadedOrder { order, items }
    }

    pub fn single(id: &str, is_sell: bool, token: Option<&str>, price: Decimal) -> LoadedOrder {
        bundle(id, is_sell, &[token], price)
    }
}
