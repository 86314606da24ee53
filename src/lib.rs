//! # NFT Flow Match
//!
//! Order-matching core of an off-chain NFT orderbook.
//!
//! ## Architecture
//!
//! - **Types**: persisted documents (`OrderData`, `OrderItemData`), price
//!   ramps and match records
//! - **Store**: the async document-store seam and an in-memory backend
//! - **Constraints**: composable layers that validate candidates and build
//!   the store query enumerating them
//! - **Orders**: orders and items bound to a chain and a store
//! - **Graph**: slab-backed unit-capacity flow graph and node collections
//! - **Algorithms**: one-to-one and one-to-many match searches
//! - **OrdersGraph**: per-root-order orchestration
//!
//! ## Design Principles
//!
//! 1. **Determinism**: decimal arithmetic and stable orderings, so the same
//!    orders always produce the same records and record ids
//! 2. **Sound queries**: a store query never drops a document the chain
//!    would accept
//! 3. **Isolated searches**: every search owns its graph; nothing is shared
//!    between concurrent searches
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use nft_flow_match::store::MemoryOrderStore;
//! use nft_flow_match::types::{OrderData, OrderItemData, OrderStatus};
//! use nft_flow_match::OrdersGraph;
//! use rust_decimal::Decimal;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let order = |id: &str, is_sell: bool| OrderData {
//!     id: id.to_string(),
//!     chain_id: "1".to_string(),
//!     is_sell_order: is_sell,
//!     num_items: 1,
//!     start_price_eth: Decimal::new(1, 1),
//!     end_price_eth: Decimal::new(1, 1),
//!     start_time_ms: 0,
//!     end_time_ms: 3_600_000,
//!     maker_address: format!("0x{id}"),
//!     taker_address: None,
//!     complication_address: "0xcomplication".to_string(),
//!     currency_address: "0xweth".to_string(),
//!     status: OrderStatus::ValidActive,
//! };
//!
//! let store = Arc::new(MemoryOrderStore::new());
//! for (id, is_sell) in [("listing", true), ("offer", false)] {
//!     let data = order(id, is_sell);
//!     let item = OrderItemData::for_order(&data, format!("{id}-0"), "0xcoll", Some("1".to_string()), 1);
//!     store.insert_order(data, vec![item]).await;
//! }
//!
//! let graph = OrdersGraph::new(order("listing", true), store);
//! let result = graph.search(None).await.unwrap();
//! assert_eq!(result.matches.len(), 1);
//! assert_eq!(result.matches[0].price(), Decimal::new(1, 1));
//! # });
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: orders, items, prices, match records
pub mod types;

/// Document-store seam and in-memory backend
pub mod store;

/// Constraint layers and the chain that folds them
pub mod constraints;

/// Orders and items bound to a chain and a store
pub mod orders;

/// Unit-capacity flow graph
pub mod graph;

/// One-to-one and one-to-many searches
pub mod algorithms;

pub mod config;
pub mod error;

mod orders_graph;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::MatchingConfig;
pub use error::{ConfigError, GraphError, MatchError, Result};
pub use orders_graph::{OrdersGraph, SearchResult};
pub use types::{MatchRecord, OneToManyMatch, OneToOneMatch, OrderData, OrderItemData, OrderStatus, Side};
