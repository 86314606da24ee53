//! In-memory order store.
//!
//! Evaluates [`Query`] exactly as the store contract describes: filters,
//! then `OrderBy` ordering, then the cursor, then the page limit. Used by the
//! tests and the demo binary.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{OrderStore, Query, StoreError};
use crate::types::{OrderData, OrderItemData};

#[derive(Debug, Default)]
struct Documents {
    orders: BTreeMap<String, OrderData>,
    /// Keyed by item id
    items: BTreeMap<String, OrderItemData>,
}

/// Thread-safe in-memory store keyed by document id.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    documents: RwLock<Documents>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an order together with its items.
    ///
    /// Items previously stored for the same order are dropped.
    pub async fn insert_order(&self, order: OrderData, items: Vec<OrderItemData>) {
        let mut docs = self.documents.write().await;
        docs.items.retain(|_, item| item.order_id != order.id);
        for item in items {
            docs.items.insert(item.id.clone(), item);
        }
        docs.orders.insert(order.id.clone(), order);
    }

    /// Remove an order and its items. Returns whether it existed.
    pub async fn remove_order(&self, order_id: &str) -> bool {
        let mut docs = self.documents.write().await;
        docs.items.retain(|_, item| item.order_id != order_id);
        docs.orders.remove(order_id).is_some()
    }

    pub async fn order_count(&self) -> usize {
        self.documents.read().await.orders.len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn query_order_items(&self, query: &Query) -> Result<Vec<OrderItemData>, StoreError> {
        if query.inequality_fields().len() > 1 {
            return Err(StoreError::Backend(format!(
                "range filters on more than one field: {:?}",
                query.inequality_fields()
            )));
        }

        let docs = self.documents.read().await;
        let mut page: Vec<OrderItemData> = docs
            .items
            .values()
            .filter(|item| query.matches(item) && query.is_after_cursor(item))
            .cloned()
            .collect();
        page.sort_by(|a, b| query.ordering().compare(a, b));
        if let Some(limit) = query.page_limit() {
            page.truncate(limit);
        }

        debug!(returned = page.len(), "memory store query");
        Ok(page)
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<OrderData>, StoreError> {
        Ok(self.documents.read().await.orders.get(order_id).cloned())
    }

    async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItemData>, StoreError> {
        let docs = self.documents.read().await;
        Ok(docs
            .items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Field, OrderBy, RangeOp};
    use crate::types::OrderStatus;
    use rust_decimal_macros::dec;

    fn order(id: &str, end_time_ms: u64) -> OrderData {
        OrderData {
            id: id.to_string(),
            chain_id: "1".to_string(),
            is_sell_order: true,
            num_items: 1,
            start_price_eth: dec!(1),
            end_price_eth: dec!(1),
            start_time_ms: 0,
            end_time_ms,
            maker_address: "0xmaker".to_string(),
            taker_address: None,
            complication_address: "0xc".to_string(),
            currency_address: "0xweth".to_string(),
            status: OrderStatus::ValidActive,
        }
    }

    async fn seeded(count: usize) -> MemoryOrderStore {
        let store = MemoryOrderStore::new();
        for i in 0..count {
            let o = order(&format!("o{i:02}"), 100 + i as u64);
            let item = OrderItemData::for_order(&o, format!("o{i:02}-0"), "0xcoll", Some(format!("{}", i % 3)), 1);
            store.insert_order(o, vec![item]).await;
        }
        store
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = seeded(3).await;
        assert_eq!(store.order_count().await, 3);
        assert!(store.get_order("o01").await.unwrap().is_some());
        assert!(store.get_order("missing").await.unwrap().is_none());
        assert_eq!(store.get_order_items("o01").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_drops_old_items() {
        let store = seeded(1).await;
        let o = order("o00", 100);
        let items = vec![
            OrderItemData::for_order(&o, "o00-a", "0xcoll", None, 1),
            OrderItemData::for_order(&o, "o00-b", "0xcoll", None, 1),
        ];
        store.insert_order(o, items).await;

        let ids: Vec<String> = store
            .get_order_items("o00")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["o00-a", "o00-b"]);

        assert!(store.remove_order("o00").await);
        assert!(store.get_order_items("o00").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_orders_and_paginates() {
        let store = seeded(7).await;
        let order_by = OrderBy::new([Field::TokenId]);
        let base = Query::new().order_by(order_by.clone()).limit(3);

        let mut seen = Vec::new();
        let mut query = base.clone();
        loop {
            let page = store.query_order_items(&query).await.unwrap();
            let done = page.len() < 3;
            if let Some(last) = page.last() {
                query = base.clone().start_after(order_by.cursor_for(last));
            }
            seen.extend(page.into_iter().map(|i| i.id));
            if done {
                break;
            }
        }

        // token "0": o00,o03,o06; "1": o01,o04; "2": o02,o05
        assert_eq!(seen, vec!["o00-0", "o03-0", "o06-0", "o01-0", "o04-0", "o02-0", "o05-0"]);
    }

    #[tokio::test]
    async fn test_query_rejects_two_range_fields() {
        let store = seeded(1).await;
        let query = Query::new()
            .where_range(Field::EndTimeMs, RangeOp::Ge, 0u64)
            .where_range(Field::StartTimeMs, RangeOp::Le, 10u64);
        assert!(matches!(
            store.query_order_items(&query).await,
            Err(StoreError::Backend(_))
        ));
    }
}
