//! Token-id layer.
//!
//! A pinned item matches an opposing item pinned to the same token or one
//! that accepts any token of the collection. Two different concrete ids
//! never match. When the item is pinned this layer is the most selective
//! one in the chain and owns pagination.

use crate::constraints::{Constraint, ConstraintKind};
use crate::store::{Field, FieldValue, OrderBy, Query};
use crate::types::OrderItemData;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenIdConstraint;

impl Constraint for TokenIdConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::TokenId
    }

    fn score(&self) -> u32 {
        10
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if !item.has_token_id() || !candidate.has_token_id() || item.token_id == candidate.token_id {
            return Ok(());
        }
        Err(format!(
            "token {} != {}",
            candidate.token_id.as_deref().unwrap_or_default(),
            item.token_id.as_deref().unwrap_or_default()
        ))
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        match item.field(Field::TokenId) {
            FieldValue::Null => query,
            pinned => query.where_in(Field::TokenId, vec![pinned, FieldValue::Null]),
        }
    }

    fn order_by(&self, item: &OrderItemData) -> Option<OrderBy> {
        item.has_token_id()
            .then(|| OrderBy::new([Field::TokenId, Field::CollectionAddress]))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
