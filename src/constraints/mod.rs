//! Constraint chain: candidate validation and query building.
//!
//! ## Architecture
//!
//! Each [`Constraint`] contributes one predicate and, where the predicate is
//! expressible as a store filter, one query refinement. A
//! [`ConstraintChain`] folds an ordered list of layers:
//!
//! - `is_match` is the AND of every layer, collecting every violation
//! - `build_query` applies every layer's refinement to an empty query
//! - the highest-scoring layer that defines an ordering owns pagination
//!
//! Refinements may only ever widen what the predicate accepts: the query
//! returns a superset of the documents `is_match` accepts, never a subset.
//!
//! ## Standard order
//!
//! | # | Layer | Query |
//! |---|-------|-------|
//! | 1 | status | `status == validActive` |
//! | 2 | side | `isSellOrder == !side` |
//! | 3 | chain id | `chainId ==` |
//! | 4 | collection | `collectionAddress ==` |
//! | 5 | token id | `tokenId in [id, null]` |
//! | 6 | quantity | `numTokens ==` |
//! | 7 | end time | `endTimeMs >= startTimeMs` |
//! | 8 | start time | (predicate only) |
//! | 9 | price | (predicate only) |
//! | 10 | distinct maker | (predicate only) |
//! | 11 | taker | `takerAddress in [null, maker]`, `makerAddress == taker` |
//! | 12 | pricing engine | `complicationAddress ==` |
//! | 13 | currency | `currencyAddress ==` |

use std::fmt;

use serde::Serialize;

use crate::store::{OrderBy, Query};
use crate::types::OrderItemData;

mod fields;
mod maker;
mod price;
mod time;
mod token_id;

pub use fields::{
    ChainIdConstraint, CollectionConstraint, ComplicationConstraint, CurrencyConstraint,
    QuantityConstraint, SideConstraint, StatusConstraint,
};
pub use maker::{DistinctMakerConstraint, TakerConstraint};
pub use price::PriceConstraint;
pub use time::{EndTimeConstraint, StartTimeConstraint};
pub use token_id::TokenIdConstraint;

// ============================================================================
// Validation results
// ============================================================================

/// Identifies the layer that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstraintKind {
    Status,
    Side,
    ChainId,
    Collection,
    TokenId,
    Quantity,
    EndTime,
    StartTime,
    Price,
    DistinctMaker,
    Taker,
    Complication,
    Currency,
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub constraint: ConstraintKind,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.constraint, self.detail)
    }
}

/// Outcome of validating a candidate against an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    pub reasons: Vec<Violation>,
}

impl ValidationResponse {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            reasons: Vec::new(),
        }
    }

    /// Record a violation and mark the response invalid
    pub fn reject(&mut self, constraint: ConstraintKind, detail: impl Into<String>) {
        self.is_valid = false;
        self.reasons.push(Violation {
            constraint,
            detail: detail.into(),
        });
    }

    /// Whether `kind` is among the violations
    pub fn violates(&self, kind: ConstraintKind) -> bool {
        self.reasons.iter().any(|v| v.constraint == kind)
    }
}

impl Default for ValidationResponse {
    fn default() -> Self {
        Self::valid()
    }
}

// ============================================================================
// Constraint trait
// ============================================================================

/// One layer of the chain.
///
/// `item` is always the order item the chain is built for; `candidate` is an
/// opposing item read from the store.
pub trait Constraint: fmt::Debug + Send + Sync {
    fn kind(&self) -> ConstraintKind;

    /// Selectivity weight; the highest-scoring layer with an ordering owns
    /// pagination.
    fn score(&self) -> u32 {
        0
    }

    /// Test the candidate. `Err` carries a human-readable detail.
    fn check(&self, item: &OrderItemData, candidate: &OrderItemData) -> Result<(), String>;

    /// Narrow the candidate query. Layers without a filterable predicate
    /// return the query unchanged.
    fn refine_query(&self, _item: &OrderItemData, query: Query) -> Query {
        query
    }

    /// Ordering this layer would use to paginate, if any.
    fn order_by(&self, _item: &OrderItemData) -> Option<OrderBy> {
        None
    }
}

// ============================================================================
// ConstraintChain
// ============================================================================

/// An ordered list of constraint layers.
#[derive(Debug)]
pub struct ConstraintChain {
    layers: Vec<Box<dyn Constraint>>,
}

impl ConstraintChain {
    /// Build a chain from explicit layers, applied in the given order
    pub fn new(layers: Vec<Box<dyn Constraint>>) -> Self {
        Self { layers }
    }

    /// The full matching chain in index-efficient order.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(StatusConstraint),
            Box::new(SideConstraint),
            Box::new(ChainIdConstraint),
            Box::new(CollectionConstraint),
            Box::new(TokenIdConstraint),
            Box::new(QuantityConstraint),
            Box::new(EndTimeConstraint),
            Box::new(StartTimeConstraint),
            Box::new(PriceConstraint),
            Box::new(DistinctMakerConstraint),
            Box::new(TakerConstraint),
            Box::new(ComplicationConstraint),
            Box::new(CurrencyConstraint),
        ])
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn kinds(&self) -> Vec<ConstraintKind> {
        self.layers.iter().map(|l| l.kind()).collect()
    }

    /// Validate `candidate` against every layer.
    ///
    /// All layers run, so the response lists every violated rule.
    pub fn is_match(&self, item: &OrderItemData, candidate: &OrderItemData) -> ValidationResponse {
        self.layers
            .iter()
            .fold(ValidationResponse::valid(), |mut response, layer| {
                if let Err(detail) = layer.check(item, candidate) {
                    response.reject(layer.kind(), detail);
                }
                response
            })
    }

    /// Pagination order: owned by the highest-scoring layer that defines one,
    /// falling back to document id.
    pub fn order_by(&self, item: &OrderItemData) -> OrderBy {
        self.layers
            .iter()
            .filter_map(|layer| layer.order_by(item).map(|o| (layer.score(), o)))
            .fold(None, |best: Option<(u32, OrderBy)>, (score, order_by)| match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, order_by)),
            })
            .map(|(_, order_by)| order_by)
            .unwrap_or_default()
    }

    /// Compose the candidate query for `item`.
    pub fn build_query(&self, item: &OrderItemData) -> Query {
        self.layers
            .iter()
            .fold(Query::new(), |query, layer| layer.refine_query(item, query))
            .order_by(self.order_by(item))
    }
}

impl Default for ConstraintChain {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Test fixtures
// ============================================================================


// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::store::{Field, RangeOp};

    #[test]
    fn test_standard_chain_order() {
        let chain = ConstraintChain::standard();
        assert_eq!(
            chain.kinds(),
            vec![
                ConstraintKind::Status,
                ConstraintKind::Side,
                ConstraintKind::ChainId,
                ConstraintKind::Collection,
                ConstraintKind::TokenId,
                ConstraintKind::Quantity,
                ConstraintKind::EndTime,
                ConstraintKind::StartTime,
                ConstraintKind::Price,
                ConstraintKind::DistinctMaker,
                ConstraintKind::Taker,
                ConstraintKind::Complication,
                ConstraintKind::Currency,
            ]
        );
    }

    #[test]
    fn test_compatible_pair_matches_both_ways() {
        let chain = ConstraintChain::standard();
        let l = listing(Some("1"));
        let o = offer(Some("1"));

        assert!(chain.is_match(&l, &o).is_valid);
        assert!(chain.is_match(&o, &l).is_valid);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let chain = ConstraintChain::standard();
        let l = listing(Some("1"));
        let mut o = offer(Some("2"));
        o.chain_id = "137".to_string();
        o.maker_address = l.maker_address.clone();

        let response = chain.is_match(&l, &o);
        assert!(!response.is_valid);
        assert!(response.violates(ConstraintKind::ChainId));
        assert!(response.violates(ConstraintKind::TokenId));
        assert!(response.violates(ConstraintKind::DistinctMaker));
        assert_eq!(response.reasons.len(), 3);
    }

    #[test]
    fn test_query_has_single_inequality() {
        let chain = ConstraintChain::standard();
        let query = chain.build_query(&listing(Some("1")));
        assert_eq!(query.inequality_fields(), vec![Field::EndTimeMs]);
        assert!(query
            .filters()
            .contains(&crate::store::Filter::Range(Field::EndTimeMs, RangeOp::Ge, START.into())));
    }

    #[test]
    fn test_query_is_superset_of_predicate() {
        let chain = ConstraintChain::standard();
        let l = listing(Some("1"));
        let query = chain.build_query(&l);

        let candidates = [offer(Some("1")), offer(None), offer(Some("2")), listing(Some("1"))];
        for candidate in &candidates {
            if chain.is_match(&l, candidate).is_valid {
                assert!(query.matches(candidate), "query dropped {}", candidate.id);
            }
        }
        assert!(query.matches(&offer(None)));
        assert!(!query.matches(&offer(Some("2"))));
    }

    #[test]
    fn test_token_id_owns_ordering_when_pinned() {
        let chain = ConstraintChain::standard();
        assert_eq!(
            chain.order_by(&listing(Some("1"))).fields(),
            &[Field::TokenId, Field::CollectionAddress, Field::Id]
        );
        assert_eq!(
            chain.order_by(&offer(None)).fields(),
            &[Field::CollectionAddress, Field::Id]
        );
    }

    #[test]
    fn test_empty_chain_accepts_everything() {
        let chain = ConstraintChain::new(Vec::new());
        assert!(chain.is_empty());
        assert!(chain.is_match(&listing(None), &listing(None)).is_valid);
        assert_eq!(chain.build_query(&listing(None)).ordering(), &OrderBy::by_id());
    }
}
