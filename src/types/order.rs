//! Persisted order documents.
//!
//! ## Documents
//!
//! - [`OrderData`]: one signed order (listing or offer) as stored
//! - [`OrderItemData`]: one collection-scoped line of an order, optionally
//!   pinned to a token id. Items denormalise the order's cross-cutting fields
//!   so that the store can filter on them directly.
//!
//! Field names serialise in camelCase to match the stored documents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::price::{self, Intersection, PriceRamp};

// ============================================================================
// Side enum
// ============================================================================

/// Order side.
///
/// Persisted as `isSellOrder`:
/// - Buy (offer) = false
/// - Sell (listing) = true
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Offer - wants to acquire NFTs
    #[default]
    Buy,
    /// Listing - wants to sell NFTs
    Sell,
}

impl Side {
    /// Convert from the persisted `isSellOrder` flag
    pub fn from_is_sell(is_sell_order: bool) -> Self {
        if is_sell_order {
            Side::Sell
        } else {
            Side::Buy
        }
    }

    /// Convert to the persisted `isSellOrder` flag
    pub fn is_sell(self) -> bool {
        matches!(self, Side::Sell)
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Eligibility of an order, maintained by the event ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
    /// Signed, funded, approved and inside its time window
    #[default]
    ValidActive,
    /// Valid but not yet started or temporarily unfunded
    ValidInactive,
    /// Cancelled, filled or otherwise unusable
    Invalid,
}

impl OrderStatus {
    /// The stored string value
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::ValidActive => "validActive",
            OrderStatus::ValidInactive => "validInactive",
            OrderStatus::Invalid => "invalid",
        }
    }
}

// ============================================================================
// OrderData
// ============================================================================

/// A persisted order.
///
/// `num_items` is the number of NFTs the order trades in total and equals the
/// sum of its items' `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub id: String,
    pub chain_id: String,
    pub is_sell_order: bool,
    pub num_items: u32,
    pub start_price_eth: Decimal,
    pub end_price_eth: Decimal,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub maker_address: String,
    #[serde(default)]
    pub taker_address: Option<String>,
    /// Pricing engine ("complication") contract
    pub complication_address: String,
    pub currency_address: String,
    pub status: OrderStatus,
}

impl OrderData {
    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_is_sell(self.is_sell_order)
    }

    /// The order's price curve
    pub fn price_ramp(&self) -> PriceRamp {
        PriceRamp::new(
            self.start_price_eth,
            self.end_price_eth,
            self.start_time_ms,
            self.end_time_ms,
        )
    }
}

// ============================================================================
// OrderItemData
// ============================================================================

/// One line of an order.
///
/// Identity is `(order_id, collection_address, token_id)`. An item without a
/// token id matches any token of its collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemData {
    /// Document id of this item
    pub id: String,
    pub order_id: String,
    pub chain_id: String,
    pub is_sell_order: bool,
    /// `num_items` of the parent order
    pub num_items: u32,
    pub start_price_eth: Decimal,
    pub end_price_eth: Decimal,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub maker_address: String,
    #[serde(default)]
    pub taker_address: Option<String>,
    pub complication_address: String,
    pub currency_address: String,
    pub status: OrderStatus,
    pub collection_address: String,
    #[serde(default)]
    pub token_id: Option<String>,
    /// NFTs this line contributes to the order
    pub quantity: u32,
    /// Amount per token (1 for ERC-721)
    pub num_tokens: u32,
}

impl OrderItemData {
    /// Build an item that inherits the cross-cutting fields of `order`.
    ///
    /// # Arguments
    ///
    /// * `order` - Parent order
    /// * `id` - Item document id
    /// * `collection_address` - NFT collection this line refers to
    /// * `token_id` - Concrete token, or `None` for any token in the collection
    /// * `quantity` - NFTs this line contributes to `order.num_items`
    pub fn for_order(
        order: &OrderData,
        id: impl Into<String>,
        collection_address: impl Into<String>,
        token_id: Option<String>,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order.id.clone(),
            chain_id: order.chain_id.clone(),
            is_sell_order: order.is_sell_order,
            num_items: order.num_items,
            start_price_eth: order.start_price_eth,
            end_price_eth: order.end_price_eth,
            start_time_ms: order.start_time_ms,
            end_time_ms: order.end_time_ms,
            maker_address: order.maker_address.clone(),
            taker_address: order.taker_address.clone(),
            complication_address: order.complication_address.clone(),
            currency_address: order.currency_address.clone(),
            status: order.status,
            collection_address: collection_address.into(),
            token_id,
            quantity,
            num_tokens: 1,
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_is_sell(self.is_sell_order)
    }

    /// Whether this item names a concrete token id
    pub fn has_token_id(&self) -> bool {
        self.token_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// The parent order's price curve
    pub fn price_ramp(&self) -> PriceRamp {
        PriceRamp::new(
            self.start_price_eth,
            self.end_price_eth,
            self.start_time_ms,
            self.end_time_ms,
        )
    }

    /// Agreed price and time between this item's order and an opposing one.
    ///
    /// Compares the two orders' whole price curves; the price is the
    /// listing's value at the earliest moment the offer meets it. Returns
    /// `None` for same-side items or curves that never cross.
    pub fn intersection_with(&self, other: &OrderItemData) -> Option<Intersection> {
        let (offer, listing) = match (self.side(), other.side()) {
            (Side::Buy, Side::Sell) => (self.price_ramp(), other.price_ramp()),
            (Side::Sell, Side::Buy) => (other.price_ramp(), self.price_ramp()),
            _ => return None,
        };
        price::intersection(&[offer], &[listing])
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
