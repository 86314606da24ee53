//! Core data types for the matching core
//!
//! ## Types
//!
//! - [`OrderData`]: A persisted order (listing or offer)
//! - [`OrderItemData`]: One collection-scoped line of an order
//! - [`Side`] / [`OrderStatus`]: Order side and eligibility
//! - [`MatchRecord`]: One-to-one or one-to-many match output
//!
//! ## Prices
//!
//! Prices are `rust_decimal::Decimal` amounts of the order currency (ETH),
//! ramped linearly over the order's time window. See [`price`].

mod order;
mod match_record;
pub mod price;

// Re-export all types at module level
pub use order::{OrderData, OrderItemData, OrderStatus, Side};
pub use match_record::{match_id, MatchRecord, OneToManyMatch, OneToOneMatch, OrderItemMatch};
pub use price::{Intersection, PriceRamp};
