//! A persisted order bound to the matching context.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::constraints::ConstraintChain;
use crate::error::{MatchError, Result};
use crate::orders::OrderItem;
use crate::store::OrderStore;
use crate::types::price::{intersection, Intersection};
use crate::types::{
    match_id, OneToManyMatch, OneToOneMatch, OrderData, OrderItemData, OrderItemMatch, PriceRamp, Side,
};

/// An order plus the chain and store its items are matched with.
#[derive(Clone)]
pub struct Order {
    data: Arc<OrderData>,
    chain: Arc<ConstraintChain>,
    store: Arc<dyn OrderStore>,
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.data.id)
            .field("side", &self.data.side())
            .field("num_items", &self.data.num_items)
            .finish()
    }
}

impl Order {
    /// Bind `data` to the standard constraint chain.
    pub fn new(data: OrderData, store: Arc<dyn OrderStore>) -> Self {
        Self::with_chain(data, Arc::new(ConstraintChain::standard()), store)
    }

    pub fn with_chain(data: OrderData, chain: Arc<ConstraintChain>, store: Arc<dyn OrderStore>) -> Self {
        Self {
            data: Arc::new(data),
            chain,
            store,
        }
    }

    #[inline]
    pub fn data(&self) -> &OrderData {
        &self.data
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.data.id
    }

    #[inline]
    pub fn num_items(&self) -> u32 {
        self.data.num_items
    }

    /// Load this order's items from the store, each bound to the chain.
    ///
    /// # Errors
    ///
    /// * [`MatchError::Store`] - the read failed
    /// * [`MatchError::InvalidOrder`] - the order has no items, or their
    ///   quantities do not add up to `num_items`
    pub async fn order_items(&self) -> Result<Vec<OrderItem>> {
        let items = self.store.get_order_items(self.id()).await?;
        self.bind_items(items)
    }

    /// Bind already-loaded item documents, checking the same invariants as
    /// [`Order::order_items`].
    pub fn bind_items(&self, items: Vec<OrderItemData>) -> Result<Vec<OrderItem>> {
        if items.is_empty() {
            return Err(self.invalid("order has no items"));
        }
        let total = items
            .iter()
            .try_fold(0u32, |total, i| total.checked_add(i.quantity))
            .ok_or_else(|| self.invalid("item quantities overflow"))?;
        if total != self.data.num_items {
            return Err(self.invalid(format!(
                "item quantities sum to {total}, numItems is {}",
                self.data.num_items
            )));
        }
        if let Some(stray) = items.iter().find(|i| i.order_id != self.data.id) {
            return Err(self.invalid(format!("item {} belongs to {}", stray.id, stray.order_id)));
        }

        debug!(order_id = %self.id(), items = items.len(), "bound order items");
        Ok(items
            .into_iter()
            .map(|data| OrderItem::new(data, Arc::clone(&self.chain), Arc::clone(&self.store)))
            .collect())
    }

    /// Whether every item names a concrete token id.
    pub fn is_fully_specified(&self, items: &[OrderItem]) -> bool {
        !items.is_empty() && items.iter().all(|item| item.data().has_token_id())
    }

    /// Stamp a one-to-one record for `item` of this order and `opposing`.
    pub fn one_to_one_record(&self, item: &OrderItem, opposing: &OrderItem, cross: Intersection) -> OneToOneMatch {
        OneToOneMatch {
            id: match_id([item.id(), opposing.id()]),
            order_item: item.data().clone(),
            opposing_order_item: opposing.data().clone(),
            price: cross.price,
            timestamp: cross.timestamp,
        }
    }

    /// Stamp a one-to-many record from `(root item, opposing item)` pairs.
    ///
    /// The whole order's curve is compared with the sum of the opposing
    /// orders' curves. Returns `None` when the bundle never crosses.
    pub fn one_to_many_record(&self, pairs: &[(OrderItem, OrderItem)]) -> Option<OneToManyMatch> {
        if pairs.is_empty() {
            return None;
        }
        let own = [self.data.price_ramp()];
        let others: Vec<PriceRamp> = pairs.iter().map(|(_, o)| o.data().price_ramp()).collect();
        let cross = match self.data.side() {
            Side::Buy => intersection(&own, &others),
            Side::Sell => intersection(&others, &own),
        }?;

        Some(OneToManyMatch {
            id: match_id(pairs.iter().flat_map(|(a, b)| [a.id(), b.id()])),
            order_item_matches: pairs
                .iter()
                .map(|(item, opposing)| OrderItemMatch {
                    order_item: item.data().clone(),
                    opposing_order_item: opposing.data().clone(),
                })
                .collect(),
            price: cross.price,
            timestamp: cross.timestamp,
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> MatchError {
        MatchError::InvalidOrder {
            order_id: self.data.id.clone(),
            reason: reason.into(),
        }
    }
}

/// An order together with its bound items.
#[derive(Debug, Clone)]
pub struct LoadedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl LoadedOrder {
    /// Read the items of `order` from the store.
    pub async fn load(order: Order) -> Result<Self> {
        let items = order.order_items().await?;
        Ok(Self { order, items })
    }

    pub fn id(&self) -> &str {
        self.order.id()
    }

    pub fn is_fully_specified(&self) -> bool {
        self.order.is_fully_specified(&self.items)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::fixtures::*;
    use crate::store::MemoryOrderStore;
    use rust_decimal_macros::dec;

    async fn stored(data: OrderData, tokens: &[Option<&str>]) -> (Order, Arc<MemoryOrderStore>) {
        let store = Arc::new(MemoryOrderStore::new());
        let items = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| OrderItemData::for_order(&data, format!("{}-{i}", data.id), "0xcoll", t.map(String::from), 1))
            .collect();
        store.insert_order(data.clone(), items).await;
        (Order::new(data, store.clone()), store)
    }

    #[tokio::test]
    async fn test_order_items_validates_quantities() {
        let mut data = order("bundle", false, dec!(0.3));
        data.num_items = 3;

        let (full, _) = stored(data.clone(), &[Some("1"), Some("2"), Some("3")]).await;
        let items = full.order_items().await.unwrap();
        assert_eq!(items.len(), 3);
        assert!(full.is_fully_specified(&items));

        let (short, _) = stored(data, &[Some("1"), None]).await;
        assert!(matches!(
            short.order_items().await,
            Err(MatchError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn test_overflowing_quantities_rejected() {
        let mut data = order("bundle", false, dec!(0.2));
        data.num_items = 2;
        let huge = OrderItemData::for_order(&data, "bundle-0", "0xcoll", Some("1".to_string()), u32::MAX);
        let rest = OrderItemData::for_order(&data, "bundle-1", "0xcoll", Some("2".to_string()), 2);

        let o = Order::new(data, Arc::new(MemoryOrderStore::new()));
        match o.bind_items(vec![huge, rest]) {
            Err(MatchError::InvalidOrder { reason, .. }) => assert!(reason.contains("overflow"), "{reason}"),
            other => panic!("expected invalid order, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unpinned_item_is_not_fully_specified() {
        let mut data = order("bundle", false, dec!(0.2));
        data.num_items = 2;
        let (o, _) = stored(data, &[Some("1"), None]).await;
        let loaded = LoadedOrder::load(o).await.unwrap();
        assert!(!loaded.is_fully_specified());
        assert!(!loaded.order.is_fully_specified(&[]));
    }

    #[tokio::test]
    async fn test_missing_items_rejected() {
        let store = Arc::new(MemoryOrderStore::new());
        let o = Order::new(order("ghost", true, dec!(1)), store);
        assert!(matches!(o.order_items().await, Err(MatchError::InvalidOrder { .. })));
    }

    #[tokio::test]
    async fn test_records_have_stable_ids() {
        let (root, _) = stored(order("listing", true, dec!(0.1)), &[Some("1")]).await;
        let (other, _) = stored(order("offer", false, dec!(0.1)), &[Some("1")]).await;
        let a = root.order_items().await.unwrap().remove(0);
        let b = other.order_items().await.unwrap().remove(0);

        let cross = a.data().intersection_with(b.data()).unwrap();
        let forward = root.one_to_one_record(&a, &b, cross);
        let backward = other.one_to_one_record(&b, &a, cross);
        assert_eq!(forward.id, backward.id);
        assert_eq!(forward.price, dec!(0.1));
        assert_eq!(forward.timestamp, START);
    }

    #[tokio::test]
    async fn test_bundle_record_uses_summed_curves() {
        let mut data = order("bundle", false, dec!(0.3));
        data.num_items = 3;
        let (root, _) = stored(data, &[Some("1"), Some("2"), Some("3")]).await;
        let items = root.order_items().await.unwrap();

        let mut pairs = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let token = format!("{}", i + 1);
            let (l, _) = stored(order(&format!("listing-{i}"), true, dec!(0.1)), &[Some(token.as_str())]).await;
            pairs.push((item.clone(), l.order_items().await.unwrap().remove(0)));
        }

        let record = root.one_to_many_record(&pairs).unwrap();
        assert_eq!(record.num_items(), 3);
        assert_eq!(record.price, dec!(0.3));

        // Two listings cost 0.2; the whole bundle offer still pays for them
        assert!(root.one_to_many_record(&pairs[..2]).is_some());
        assert!(root.one_to_many_record(&[]).is_none());
    }
}
