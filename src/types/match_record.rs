//! Match records emitted by the search algorithms.
//!
//! Records are immutable once produced and are persisted by the settlement
//! layer. Each carries a deterministic id so that re-running a search over
//! the same orders yields the same record ids.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::OrderItemData;

/// Exact pairing of two single-item opposing orders.
///
/// ## Price Discovery
///
/// `price` and `timestamp` are the earliest point at which the offer meets
/// the listing inside both orders' windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneToOneMatch {
    pub id: String,
    pub order_item: OrderItemData,
    pub opposing_order_item: OrderItemData,
    pub price: Decimal,
    pub timestamp: u64,
}

/// One edge of a one-to-many fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemMatch {
    pub order_item: OrderItemData,
    pub opposing_order_item: OrderItemData,
}

/// A multi-item order filled by several single-item opposing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneToManyMatch {
    pub id: String,
    pub order_item_matches: Vec<OrderItemMatch>,
    /// Agreed price for the whole bundle
    pub price: Decimal,
    pub timestamp: u64,
}

impl OneToManyMatch {
    /// Number of NFTs moved by this match
    pub fn num_items(&self) -> usize {
        self.order_item_matches.len()
    }
}

/// Either shape of match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatchRecord {
    OneToOne(OneToOneMatch),
    OneToMany(OneToManyMatch),
}

impl MatchRecord {
    pub fn id(&self) -> &str {
        match self {
            MatchRecord::OneToOne(m) => &m.id,
            MatchRecord::OneToMany(m) => &m.id,
        }
    }

    pub fn price(&self) -> Decimal {
        match self {
            MatchRecord::OneToOne(m) => m.price,
            MatchRecord::OneToMany(m) => m.price,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            MatchRecord::OneToOne(m) => m.timestamp,
            MatchRecord::OneToMany(m) => m.timestamp,
        }
    }
}

impl From<OneToOneMatch> for MatchRecord {
    fn from(value: OneToOneMatch) -> Self {
        MatchRecord::OneToOne(value)
    }
}

impl From<OneToManyMatch> for MatchRecord {
    fn from(value: OneToManyMatch) -> Self {
        MatchRecord::OneToMany(value)
    }
}

/// Compute a match id from the participating order-item ids.
///
/// Ids are sorted first, so the result does not depend on which side was
/// the root of the search.
pub fn match_id<'a>(item_ids: impl IntoIterator<Item = &'a str>) -> String {
    let mut ids: Vec<&str> = item_ids.into_iter().collect();
    ids.sort_unstable();

    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

// ============================================================================
// Unit Tests
// ============================================================================
