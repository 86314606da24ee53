//! Price layer: the offer curve must reach the listing curve somewhere in the
//! common window. Not expressible as a store filter.
//!
//! Whole-order curves are compared. A listing of several items is only
//! priced as a whole, so a single offer is never rejected against one here;
//! the bundle's own intersection decides.

use crate::constraints::{Constraint, ConstraintKind};
use crate::types::price::format_eth;
use crate::types::OrderItemData;

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceConstraint;

impl Constraint for PriceConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Price
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        let listing = if item.is_sell_order { item } else { candidate };
        if item.side() != candidate.side() && listing.num_items > 1 {
            return Ok(());
        }

        match item.intersection_with(candidate) {
            Some(_) => Ok(()),
            None => Err(format!(
                "price curves never cross ({}..{} vs {}..{})",
                format_eth(item.start_price_eth),
                format_eth(item.end_price_eth),
                format_eth(candidate.start_price_eth),
                format_eth(candidate.end_price_eth),
            )),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
