//! Counterparty layers.

use crate::constraints::{Constraint, ConstraintKind};
use crate::store::{Field, FieldValue, Query};
use crate::types::OrderItemData;

/// A maker cannot trade against themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctMakerConstraint;

impl Constraint for DistinctMakerConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::DistinctMaker
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if item.maker_address.eq_ignore_ascii_case(&candidate.maker_address) {
            Err(format!("same maker {}", item.maker_address))
        } else {
            Ok(())
        }
    }
}

/// Private orders.
///
/// An item with a taker only accepts candidates made by that taker, and a
/// candidate with a taker only accepts this item's maker.
#[derive(Debug, Clone, Copy, Default)]
pub struct TakerConstraint;

fn taker(item: &OrderItemData) -> Option<&str> {
    item.taker_address.as_deref().filter(|t| !t.is_empty())
}

impl Constraint for TakerConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Taker
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if let Some(t) = taker(item) {
            if t != candidate.maker_address {
                return Err(format!("item is reserved for {t}"));
            }
        }
        if let Some(t) = taker(candidate) {
            if t != item.maker_address {
                return Err(format!("candidate is reserved for {t}"));
            }
        }
        Ok(())
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        let query = query.where_in(
            Field::TakerAddress,
            vec![FieldValue::Null, item.maker_address.as_str().into()],
        );
        match taker(item) {
            Some(t) => query.where_eq(Field::MakerAddress, t),
            None => query,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::fixtures::*;

    #[test]
    fn test_self_trade_rejected() {
        let l = listing(None);
        let mut o = offer(None);
        assert!(DistinctMakerConstraint.check(&l, &o).is_ok());

        o.maker_address = l.maker_address.to_uppercase();
        assert!(DistinctMakerConstraint.check(&l, &o).is_err());
    }

    #[test]
    fn test_private_item_only_accepts_its_taker() {
        let mut l = listing(None);
        let o = offer(None);
        l.taker_address = Some("0xsomeone".to_string());
        assert!(TakerConstraint.check(&l, &o).is_err());
        assert!(!TakerConstraint.refine_query(&l, Query::new()).matches(&o));

        l.taker_address = Some(o.maker_address.clone());
        assert!(TakerConstraint.check(&l, &o).is_ok());
        assert!(TakerConstraint.refine_query(&l, Query::new()).matches(&o));
    }

    #[test]
    fn test_private_candidate_only_accepts_item_maker() {
        let l = listing(None);
        let mut o = offer(None);
        o.taker_address = Some("0xsomeone".to_string());
        assert!(TakerConstraint.check(&l, &o).is_err());
        assert!(!TakerConstraint.refine_query(&l, Query::new()).matches(&o));

        o.taker_address = Some(l.maker_address.clone());
        assert!(TakerConstraint.check(&l, &o).is_ok());
        assert!(TakerConstraint.refine_query(&l, Query::new()).matches(&o));
    }

    #[test]
    fn test_empty_taker_is_public() {
        let mut l = listing(None);
        l.taker_address = Some(String::new());
        assert!(TakerConstraint.check(&l, &offer(None)).is_ok());
    }
}
