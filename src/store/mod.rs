//! Document-store seam.
//!
//! The matching core reads from the store through [`OrderStore`] only:
//! paginated candidate queries built by the constraint chain, and point reads
//! of orders and their items. The client is injected as
//! `Arc<dyn OrderStore>`; there is no global handle.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{OrderData, OrderItemData};

pub mod query;

/// Re-export implementations
pub mod implementations {
    pub mod memory;
}

pub use implementations::memory::MemoryOrderStore;
pub use query::{Cursor, Field, FieldValue, Filter, OrderBy, Query, RangeOp};

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A document that must exist was not found.
    #[error("Not found: {0}")]
    NotFound(String),
    /// A stored document could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The backend failed.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Read access to persisted orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch one page of order items satisfying `query`.
    ///
    /// Results follow `query.ordering()`, start strictly after
    /// `query.cursor()` and contain at most `query.page_limit()` documents.
    async fn query_order_items(&self, query: &Query) -> Result<Vec<OrderItemData>, StoreError>;

    /// Fetch an order by id.
    async fn get_order(&self, order_id: &str) -> Result<Option<OrderData>, StoreError>;

    /// Fetch all items of an order, in item-id order.
    async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItemData>, StoreError>;
}

impl fmt::Debug for dyn OrderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn OrderStore")
    }
}
