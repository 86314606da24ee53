//! Store-agnostic query model for order-item documents.
//!
//! A [`Query`] is a conjunction of [`Filter`]s, one [`OrderBy`] and an
//! optional cursor. Backends may index however they like but must return
//! documents in `OrderBy` order and resume strictly after the cursor.
//!
//! Only one field may carry a range filter, the same restriction document
//! stores with composite indexes impose.

use std::cmp::Ordering;

use crate::types::OrderItemData;

// ============================================================================
// Fields and values
// ============================================================================

/// Filterable/orderable fields of an order-item document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Id,
    OrderId,
    ChainId,
    IsSellOrder,
    Status,
    CollectionAddress,
    TokenId,
    NumItems,
    NumTokens,
    StartTimeMs,
    EndTimeMs,
    MakerAddress,
    TakerAddress,
    ComplicationAddress,
    CurrencyAddress,
}

impl Field {
    /// Document field name
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::OrderId => "orderId",
            Field::ChainId => "chainId",
            Field::IsSellOrder => "isSellOrder",
            Field::Status => "status",
            Field::CollectionAddress => "collectionAddress",
            Field::TokenId => "tokenId",
            Field::NumItems => "numItems",
            Field::NumTokens => "numTokens",
            Field::StartTimeMs => "startTimeMs",
            Field::EndTimeMs => "endTimeMs",
            Field::MakerAddress => "makerAddress",
            Field::TakerAddress => "takerAddress",
            Field::ComplicationAddress => "complicationAddress",
            Field::CurrencyAddress => "currencyAddress",
        }
    }
}

/// A scalar document value. Variants order as `Null < Bool < Int < Str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(u64),
    Str(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(u64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Null, FieldValue::Str)
    }
}

impl OrderItemData {
    /// Read a field as the store sees it.
    ///
    /// Missing optional values and empty strings read as [`FieldValue::Null`].
    pub fn field(&self, field: Field) -> FieldValue {
        let optional = |value: &Option<String>| match value.as_deref() {
            Some(s) if !s.is_empty() => FieldValue::Str(s.to_string()),
            _ => FieldValue::Null,
        };

        match field {
            Field::Id => self.id.as_str().into(),
            Field::OrderId => self.order_id.as_str().into(),
            Field::ChainId => self.chain_id.as_str().into(),
            Field::IsSellOrder => self.is_sell_order.into(),
            Field::Status => self.status.as_str().into(),
            Field::CollectionAddress => self.collection_address.as_str().into(),
            Field::TokenId => optional(&self.token_id),
            Field::NumItems => self.num_items.into(),
            Field::NumTokens => self.num_tokens.into(),
            Field::StartTimeMs => self.start_time_ms.into(),
            Field::EndTimeMs => self.end_time_ms.into(),
            Field::MakerAddress => self.maker_address.as_str().into(),
            Field::TakerAddress => optional(&self.taker_address),
            Field::ComplicationAddress => self.complication_address.as_str().into(),
            Field::CurrencyAddress => self.currency_address.as_str().into(),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Range comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl RangeOp {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            RangeOp::Lt => ordering == Ordering::Less,
            RangeOp::Le => ordering != Ordering::Greater,
            RangeOp::Gt => ordering == Ordering::Greater,
            RangeOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// A single predicate on one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    Eq(Field, FieldValue),
    /// Field equals any of the values
    In(Field, Vec<FieldValue>),
    Range(Field, RangeOp, FieldValue),
}

impl Filter {
    pub fn field(&self) -> Field {
        match self {
            Filter::Eq(field, _) | Filter::In(field, _) | Filter::Range(field, _, _) => *field,
        }
    }

    pub fn is_inequality(&self) -> bool {
        matches!(self, Filter::Range(..))
    }

    pub fn matches(&self, doc: &OrderItemData) -> bool {
        let actual = doc.field(self.field());
        match self {
            Filter::Eq(_, expected) => actual == *expected,
            Filter::In(_, options) => options.contains(&actual),
            Filter::Range(_, op, bound) => {
                // Nulls never satisfy a range
                !matches!(actual, FieldValue::Null) && op.accepts(actual.cmp(bound))
            }
        }
    }
}

// ============================================================================
// Ordering and cursors
// ============================================================================

/// Resume point: the ordering values of the last document returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cursor(pub Vec<FieldValue>);

/// Ascending ordering over one or more fields.
///
/// The document id is always appended as the final key so that ordering is
/// total and cursors are stable across retries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    fields: Vec<Field>,
}

impl OrderBy {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        let mut fields: Vec<Field> = fields.into_iter().filter(|f| *f != Field::Id).collect();
        fields.push(Field::Id);
        Self { fields }
    }

    /// Order by document id only
    pub fn by_id() -> Self {
        Self::new([])
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Cursor positioned on `doc`
    pub fn cursor_for(&self, doc: &OrderItemData) -> Cursor {
        Cursor(self.fields.iter().map(|f| doc.field(*f)).collect())
    }

    pub fn compare(&self, a: &OrderItemData, b: &OrderItemData) -> Ordering {
        self.cursor_for(a).cmp(&self.cursor_for(b))
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        Self::by_id()
    }
}

// ============================================================================
// Query
// ============================================================================

/// A composed candidate query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
    order_by: OrderBy,
    start_after: Option<Cursor>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.filter(Filter::Eq(field, value.into()))
    }

    pub fn where_in(self, field: Field, values: Vec<FieldValue>) -> Self {
        self.filter(Filter::In(field, values))
    }

    pub fn where_range(self, field: Field, op: RangeOp, value: impl Into<FieldValue>) -> Self {
        self.filter(Filter::Range(field, op, value.into()))
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &OrderBy {
        &self.order_by
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.start_after.as_ref()
    }

    pub fn page_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Distinct fields that carry a range filter
    pub fn inequality_fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self
            .filters
            .iter()
            .filter(|f| f.is_inequality())
            .map(Filter::field)
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    /// Whether `doc` satisfies every filter (ordering and cursor aside)
    pub fn matches(&self, doc: &OrderItemData) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }

    /// Whether `doc` sorts strictly after the cursor (always true without one)
    pub fn is_after_cursor(&self, doc: &OrderItemData) -> bool {
        self.start_after
            .as_ref()
            .map_or(true, |cursor| self.order_by.cursor_for(doc) > *cursor)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderData, OrderStatus};
    use rust_decimal_macros::dec;

    fn doc(id: &str, token_id: Option<&str>, end_time_ms: u64) -> OrderItemData {
        let order = OrderData {
            id: format!("order-{id}"),
            chain_id: "1".to_string(),
            is_sell_order: true,
            num_items: 1,
            start_price_eth: dec!(1),
            end_price_eth: dec!(1),
            start_time_ms: 0,
            end_time_ms,
            maker_address: "0xmaker".to_string(),
            taker_address: None,
            complication_address: "0xc".to_string(),
            currency_address: "0xweth".to_string(),
            status: OrderStatus::ValidActive,
        };
        OrderItemData::for_order(&order, id, "0xcoll", token_id.map(String::from), 1)
    }

    #[test]
    fn test_field_values() {
        let d = doc("a", Some("7"), 100);
        assert_eq!(d.field(Field::TokenId), FieldValue::Str("7".to_string()));
        assert_eq!(d.field(Field::TakerAddress), FieldValue::Null);
        assert_eq!(d.field(Field::IsSellOrder), FieldValue::Bool(true));
        assert_eq!(d.field(Field::EndTimeMs), FieldValue::Int(100));
        assert_eq!(d.field(Field::Status), FieldValue::Str("validActive".to_string()));
    }

    #[test]
    fn test_eq_and_in_filters() {
        let pinned = doc("a", Some("7"), 100);
        let open = doc("b", None, 100);

        let by_token = Query::new().where_in(Field::TokenId, vec!["7".into(), FieldValue::Null]);
        assert!(by_token.matches(&pinned));
        assert!(by_token.matches(&open));
        assert!(!by_token.matches(&doc("c", Some("8"), 100)));

        let exact = Query::new().where_eq(Field::TokenId, "7");
        assert!(exact.matches(&pinned));
        assert!(!exact.matches(&open));
    }

    #[test]
    fn test_range_filter_is_inclusive_for_ge() {
        let q = Query::new().where_range(Field::EndTimeMs, RangeOp::Ge, 100u64);
        assert!(q.matches(&doc("a", None, 100)));
        assert!(q.matches(&doc("b", None, 101)));
        assert!(!q.matches(&doc("c", None, 99)));
    }

    #[test]
    fn test_range_rejects_null() {
        let q = Query::new().where_range(Field::TokenId, RangeOp::Gt, "");
        assert!(!q.matches(&doc("a", None, 1)));
    }

    #[test]
    fn test_inequality_fields_are_deduplicated() {
        let q = Query::new()
            .where_eq(Field::ChainId, "1")
            .where_range(Field::EndTimeMs, RangeOp::Ge, 5u64)
            .where_range(Field::EndTimeMs, RangeOp::Le, 10u64);
        assert_eq!(q.inequality_fields(), vec![Field::EndTimeMs]);
    }

    #[test]
    fn test_order_by_appends_id() {
        let order_by = OrderBy::new([Field::TokenId, Field::Id, Field::CollectionAddress]);
        assert_eq!(
            order_by.fields(),
            &[Field::TokenId, Field::CollectionAddress, Field::Id]
        );
        assert_eq!(OrderBy::by_id().fields(), &[Field::Id]);
    }

    #[test]
    fn test_cursor_resumes_strictly_after() {
        let order_by = OrderBy::new([Field::TokenId]);
        let a = doc("a", Some("1"), 1);
        let b = doc("b", Some("1"), 1);
        let c = doc("c", Some("2"), 1);

        assert_eq!(order_by.compare(&a, &b), Ordering::Less);
        assert_eq!(order_by.compare(&b, &c), Ordering::Less);

        let q = Query::new().order_by(order_by.clone()).start_after(order_by.cursor_for(&b));
        assert!(!q.is_after_cursor(&a));
        assert!(!q.is_after_cursor(&b));
        assert!(q.is_after_cursor(&c));
    }
}
