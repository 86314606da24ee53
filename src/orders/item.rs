//! A line item bound to its constraint chain and store.

use std::fmt;
use std::sync::Arc;

use futures::Stream;
use rust_decimal::Decimal;

use crate::constraints::{ConstraintChain, ConstraintKind, ValidationResponse, Violation};
use crate::store::{OrderStore, Query, StoreError};
use crate::types::price::{intersection, sum_at, Intersection};
use crate::types::{OrderItemData, PriceRamp, Side};

/// Summary of a bundle of opposing items checked against one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleValidation {
    Valid {
        /// NFTs moved by the bundle
        num_items: u32,
        /// Concrete token ids traded, sorted
        token_ids: Vec<String>,
        price: Decimal,
        timestamp: u64,
    },
    Invalid {
        reasons: Vec<Violation>,
    },
}

impl BundleValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, BundleValidation::Valid { .. })
    }
}

/// An order item ready for matching.
///
/// Cheap to clone: the document, chain and store are shared.
#[derive(Clone)]
pub struct OrderItem {
    data: Arc<OrderItemData>,
    chain: Arc<ConstraintChain>,
    store: Arc<dyn OrderStore>,
}

impl fmt::Debug for OrderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderItem")
            .field("id", &self.data.id)
            .field("order_id", &self.data.order_id)
            .field("token_id", &self.data.token_id)
            .finish()
    }
}

impl OrderItem {
    pub fn new(data: OrderItemData, chain: Arc<ConstraintChain>, store: Arc<dyn OrderStore>) -> Self {
        Self {
            data: Arc::new(data),
            chain,
            store,
        }
    }

    #[inline]
    pub fn data(&self) -> &OrderItemData {
        &self.data
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// Units of flow this item may take part in.
    pub fn max_num_items_contribution(&self) -> u32 {
        self.data.quantity
    }

    /// Validate an opposing item against every constraint layer.
    pub fn is_match(&self, candidate: &OrderItemData) -> ValidationResponse {
        self.chain.is_match(&self.data, candidate)
    }

    /// The fully composed candidate query, without a page limit.
    pub fn query(&self) -> Query {
        self.chain.build_query(&self.data)
    }

    /// Lazily page through every stored candidate for this item.
    ///
    /// Pages follow the chain's ordering and resume strictly after the last
    /// document of the previous page. A store error ends the stream after
    /// being yielded.
    pub fn possible_matches(
        &self,
        page_size: usize,
    ) -> impl Stream<Item = Result<OrderItemData, StoreError>> + Send + 'static {
        let page_size = page_size.max(1);
        let base = self.query().limit(page_size);
        let ordering = base.ordering().clone();
        let store = Arc::clone(&self.store);

        async_stream::try_stream! {
            let mut query = base.clone();
            loop {
                let page = store.query_order_items(&query).await?;
                let resume = match page.last() {
                    Some(last) if page.len() >= page_size => Some(ordering.cursor_for(last)),
                    _ => None,
                };

                for doc in page {
                    yield doc;
                }

                match resume {
                    Some(cursor) => query = base.clone().start_after(cursor),
                    None => break,
                }
            }
        }
    }

    /// Check a bundle of opposing items that together fill this item.
    ///
    /// Every opposing item must pass the chain and the bundle must move
    /// exactly this item's quantity. An offer item's order curve must reach
    /// the summed opposing curves; a listing item of a multi-item order has
    /// no price of its own, so only the windows are checked and the reported
    /// price is what the opposing items pay.
    pub fn are_matches(&self, opposing: &[OrderItemData]) -> BundleValidation {
        let mut response = ValidationResponse::valid();
        for candidate in opposing {
            let check = self.is_match(candidate);
            response.reasons.extend(check.reasons);
            response.is_valid &= check.is_valid;
        }

        let moved = opposing
            .iter()
            .try_fold(0u32, |total, o| total.checked_add(o.quantity));
        match moved {
            Some(n) if n == self.data.quantity => {}
            Some(n) => response.reject(
                ConstraintKind::Quantity,
                format!("bundle moves {n} items, item needs {}", self.data.quantity),
            ),
            None => response.reject(ConstraintKind::Quantity, "bundle quantities overflow"),
        }
        let num_items = moved.unwrap_or_default();

        let own = self.data.price_ramp();
        let others: Vec<PriceRamp> = opposing.iter().map(OrderItemData::price_ramp).collect();
        let crossing = match self.data.side() {
            Side::Buy => intersection(&[own], &others),
            Side::Sell if self.data.num_items <= 1 => intersection(&others, &[own]),
            Side::Sell => {
                let floor = PriceRamp::constant(Decimal::ZERO, own.start_time_ms, own.end_time_ms);
                intersection(&others, &[floor]).map(|cross| Intersection {
                    price: sum_at(&others, cross.timestamp),
                    timestamp: cross.timestamp,
                })
            }
        };

        match crossing {
            Some(cross) if response.is_valid => {
                let mut token_ids: Vec<String> = std::iter::once(&*self.data)
                    .chain(opposing)
                    .filter(|i| i.has_token_id())
                    .filter_map(|i| i.token_id.clone())
                    .collect();
                token_ids.sort();
                token_ids.dedup();
                BundleValidation::Valid {
                    num_items,
                    token_ids,
                    price: cross.price,
                    timestamp: cross.timestamp,
                }
            }
            Some(_) => BundleValidation::Invalid {
                reasons: response.reasons,
            },
            None => {
                response.reject(ConstraintKind::Price, "bundle price curves never cross");
                BundleValidation::Invalid {
                    reasons: response.reasons,
                }
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
