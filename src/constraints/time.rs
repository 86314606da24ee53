//! Time-window layers.
//!
//! Two windows overlap when each one ends no earlier than the other starts.
//! Only the end-time half becomes a store filter: the store accepts range
//! filters on a single field per query.

use crate::constraints::{Constraint, ConstraintKind};
use crate::store::{Field, Query, RangeOp};
use crate::types::OrderItemData;

/// Candidate must not end before the item starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndTimeConstraint;

impl Constraint for EndTimeConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::EndTime
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if candidate.end_time_ms >= item.start_time_ms {
            Ok(())
        } else {
            Err(format!(
                "candidate ends at {} before item starts at {}",
                candidate.end_time_ms, item.start_time_ms
            ))
        }
    }

    fn refine_query(&self, item: &OrderItemData, query: Query) -> Query {
        query.where_range(Field::EndTimeMs, RangeOp::Ge, item.start_time_ms)
    }
}

/// Candidate must not start after the item ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartTimeConstraint;

impl Constraint for StartTimeConstraint {
    fn kind(&self) -> ConstraintKind {
        ConstraintKind::StartTime
    }

    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String> {
        if candidate.start_time_ms <= item.end_time_ms {
            Ok(())
        } else {
            Err(format!(
                "candidate starts at {} after item ends at {}",
                candidate.start_time_ms, item.end_time_ms
            ))
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
