//! Equality layers: status, side, chain id, collection, quantity, pricing
//! engine and currency.
//!
//! Each of these compares one field of the candidate against a value derived
//! from the item, so the predicate and the store filter are the same test.

use crate::constraints::{Constraint, ConstraintKind};
use crate::store::{Field, OrderBy, Query};
use crate::types::{OrderItemData, OrderStatus};

/// Candidate must be `validActive`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusConstraint;

impl Constraint for StatusConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Status
    }

    fn score(&self) -> u32 {
        1
    }

    fn check(&self, _item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if candidate.status == OrderStatus::ValidActive {
            Ok(())
        } else {
            Err(format!("candidate status is {}", candidate.status.as_str()))
        }
    }

    fn refine_query(&self, _item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::Status, OrderStatus::ValidActive.as_str())
    }

    fn order_by(&self, _item: &OrderItemData) -> Option<OrderBy> {
        Some(OrderBy::new([Field::Status, Field::CollectionAddress]))
    }
}

/// Candidate must be on the opposite side.
#[derive(Debug, Clone, Copy, Default)]
pub struct SideConstraint;

impl Constraint for SideConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Side
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.is_sell_order != candidate.is_sell_order {
            Ok(())
        } else {
            Err(format!("both orders are {:?}", item.side()))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::IsSellOrder, !item.is_sell_order)
    }
}

/// Both orders must live on the same chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainIdConstraint;

impl Constraint for ChainIdConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::ChainId
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.chain_id == candidate.chain_id {
            Ok(())
        } else {
            Err(format!("chain {} != {}", candidate.chain_id, item.chain_id))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::ChainId, item.chain_id.as_str())
    }
}

/// Both items must reference the same collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionConstraint;

impl Constraint for CollectionConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Collection
    }

    fn score(&self) -> u32 {
        5
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.collection_address == candidate.collection_address {
            Ok(())
        } else {
            Err(format!(
                "collection {} != {}",
                candidate.collection_address, item.collection_address
            ))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::CollectionAddress, item.collection_address.as_str())
    }

    fn order_by(&self, _item: &OrderItemData) -> Option<OrderBy> {
        Some(OrderBy::new([Field::CollectionAddress]))
    }
}

/// Per-token amounts must agree (1 for ERC-721).
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityConstraint;

impl Constraint for QuantityConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Quantity
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.num_tokens == candidate.num_tokens {
            Ok(())
        } else {
            Err(format!(
                "numTokens {} != {}",
                candidate.num_tokens, item.num_tokens
            ))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::NumTokens, item.num_tokens)
    }
}

/// Both orders must use the same pricing engine contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplicationConstraint;

impl Constraint for ComplicationConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Complication
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.complication_address == candidate.complication_address {
            Ok(())
        } else {
            Err(format!(
                "pricing engine {} != {}",
                candidate.complication_address, item.complication_address
            ))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::ComplicationAddress, item.complication_address.as_str())
    }
}

/// Both orders must settle in the same currency.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrencyConstraint;

impl Constraint for CurrencyConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Currency
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.currency_address == candidate.currency_address {
            Ok(())
        } else {
            Err(format!(
                "currency {} != {}",
                candidate.currency_address, item.currency_address
            ))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_eq(Field::CurrencyAddress, item.currency_address.as_str())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
