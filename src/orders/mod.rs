//! Orders and order items bound to a constraint chain and a store.
//!
//! - [`Order`] loads its items and stamps match records
//! - [`OrderItem`] validates candidates, streams them from the store and
//!   checks bundles
//! - [`LoadedOrder`] pairs an order with its bound items

mod item;
mod order;

pub use item::{BundleValidation, OrderItem};
pub use order::{LoadedOrder, Order};
