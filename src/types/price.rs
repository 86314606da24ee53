//! Price ramps and their intersections.
//!
//! ## Overview
//!
//! An order's price moves linearly from `start_price` to `end_price` over
//! its `[start_time_ms, end_time_ms]` window and is held flat outside it.
//! All arithmetic uses `rust_decimal` so identical inputs always produce
//! identical match prices.
//!
//! ## Intersection
//!
//! Two sides cross at the earliest millisecond, inside the window shared by
//! every participating order, at which the offer curve is at or above the
//! listing curve. The agreed price is the listing curve at that instant.
//! A bundle sums the ramps on a side before comparing.
//!
//! ## Examples
//!
//! ```
//! use nft_flow_match::types::price::{intersection, PriceRamp};
//! use rust_decimal::Decimal;
//!
//! // Listing falls 2 -> 1, offer rises 1 -> 2 over the same hour
//! let listing = PriceRamp::new(Decimal::from(2), Decimal::from(1), 0, 3_600_000);
//! let offer = PriceRamp::new(Decimal::from(1), Decimal::from(2), 0, 3_600_000);
//!
//! let cross = intersection(&[offer], &[listing]).unwrap();
//! assert_eq!(cross.timestamp, 1_800_000);
//! assert_eq!(cross.price, Decimal::new(15, 1));
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// PriceRamp
// ============================================================================

/// A linear price curve over a time window (prices in ETH).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRamp {
    pub start_price: Decimal,
    pub end_price: Decimal,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
}

impl PriceRamp {
    /// Create a ramp from `start_price` at `start_time_ms` to `end_price` at
    /// `end_time_ms`.
    pub fn new(start_price: Decimal, end_price: Decimal, start_time_ms: u64, end_time_ms: u64) -> Self {
        Self {
            start_price,
            end_price,
            start_time_ms,
            end_time_ms,
        }
    }

    /// A flat price over the window.
    pub fn constant(price: Decimal, start_time_ms: u64, end_time_ms: u64) -> Self {
        Self::new(price, price, start_time_ms, end_time_ms)
    }

    /// Price at `timestamp`, clamped to the window endpoints.
    ///
    /// # Example
    ///
    /// ```
    /// use nft_flow_match::types::price::PriceRamp;
    /// use rust_decimal::Decimal;
    ///
    /// let ramp = PriceRamp::new(Decimal::from(1), Decimal::from(3), 1_000, 3_000);
    /// assert_eq!(ramp.price_at(0), Decimal::from(1));
    /// assert_eq!(ramp.price_at(2_000), Decimal::from(2));
    /// assert_eq!(ramp.price_at(9_000), Decimal::from(3));
    /// ```
    pub fn price_at(&self, timestamp: u64) -> Decimal {
        if timestamp <= self.start_time_ms || self.end_time_ms <= self.start_time_ms {
            return self.start_price;
        }
        if timestamp >= self.end_time_ms {
            return self.end_price;
        }

        let elapsed = Decimal::from(timestamp - self.start_time_ms);
        let duration = Decimal::from(self.end_time_ms - self.start_time_ms);
        self.start_price + (self.end_price - self.start_price) * elapsed / duration
    }

    /// Whether `timestamp` lies inside the window (boundary-inclusive).
    pub fn contains(&self, timestamp: u64) -> bool {
        self.start_time_ms <= timestamp && timestamp <= self.end_time_ms
    }
}

/// The point at which an offer curve first meets a listing curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intersection {
    /// Agreed price in ETH
    pub price: Decimal,
    /// Agreed timestamp in milliseconds
    pub timestamp: u64,
}

// ============================================================================
// Curve arithmetic
// ============================================================================

/// Sum of several ramps evaluated at `timestamp`.
pub fn sum_at(ramps: &[PriceRamp], timestamp: u64) -> Decimal {
    ramps.iter().map(|ramp| ramp.price_at(timestamp)).sum()
}

/// Earliest crossing of the summed offer ramps over the summed listing ramps.
///
/// Returns `None` when either side is empty, the windows do not overlap, or
/// the offer stays strictly below the listing for the whole shared window.
pub fn intersection(offers: &[PriceRamp], listings: &[PriceRamp]) -> Option<Intersection> {
    if offers.is_empty() || listings.is_empty() {
        return None;
    }

    let all = || offers.iter().chain(listings.iter());
    let window_start = all().map(|r| r.start_time_ms).max()?;
    let window_end = all().map(|r| r.end_time_ms).min()?;
    if window_start > window_end {
        return None;
    }

    // Both curves are linear between consecutive breakpoints
    let mut breakpoints: Vec<u64> = all()
        .flat_map(|r| [r.start_time_ms, r.end_time_ms])
        .filter(|t| *t > window_start && *t < window_end)
        .collect();
    breakpoints.push(window_start);
    breakpoints.push(window_end);
    breakpoints.sort_unstable();
    breakpoints.dedup();

    let spread = |t: u64| sum_at(offers, t) - sum_at(listings, t);
    let at = |t: u64| Intersection {
        price: sum_at(listings, t),
        timestamp: t,
    };

    if spread(window_start) >= Decimal::ZERO {
        return Some(at(window_start));
    }

    for segment in breakpoints.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let spread_a = spread(a);
        let spread_b = spread(b);

        if spread_b < Decimal::ZERO {
            continue;
        }

        // spread_a < 0 <= spread_b: solve for the zero and round up to a whole ms
        let offset = (Decimal::from(b - a) * -spread_a / (spread_b - spread_a)).ceil();
        let candidate = a.saturating_add(offset.to_u64().unwrap_or(b - a)).min(b);

        let timestamp = [candidate, candidate.saturating_add(1).min(b)]
            .into_iter()
            .find(|t| spread(*t) >= Decimal::ZERO)
            .unwrap_or(b);
        return Some(at(timestamp));
    }

    None
}

/// Render an ETH amount without trailing zeros (for logs).
pub fn format_eth(value: Decimal) -> String {
    format!("{}", value.normalize())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HOUR: u64 = 3_600_000;

    #[test]
    fn test_price_at_flat_window() {
        let ramp = PriceRamp::new(dec!(1), dec!(2), 500, 500);
        assert_eq!(ramp.price_at(0), dec!(1));
        assert_eq!(ramp.price_at(500), dec!(1));
        assert_eq!(ramp.price_at(900), dec!(1));
    }

    #[test]
    fn test_price_at_descending() {
        let ramp = PriceRamp::new(dec!(2), dec!(1), 0, HOUR);
        assert_eq!(ramp.price_at(HOUR / 4), dec!(1.75));
        assert_eq!(ramp.price_at(HOUR), dec!(1));
    }

    #[test]
    fn test_identical_ramps_cross_at_start() {
        let t = 1_700_000_000_000;
        let sell = PriceRamp::new(dec!(1), dec!(2), t, t + HOUR);
        let buy = PriceRamp::new(dec!(1), dec!(2), t, t + HOUR);

        let cross = intersection(&[buy], &[sell]).unwrap();
        assert_eq!(cross.timestamp, t);
        assert_eq!(cross.price, dec!(1));
    }

    #[test]
    fn test_offer_below_listing_never_crosses() {
        let sell = PriceRamp::new(dec!(2), dec!(3), 0, HOUR);
        let buy = PriceRamp::new(dec!(1), dec!(1.5), 0, HOUR);
        assert!(intersection(&[buy], &[sell]).is_none());
    }

    #[test]
    fn test_rising_offer_crosses_falling_listing() {
        let sell = PriceRamp::new(dec!(2), dec!(1), 0, HOUR);
        let buy = PriceRamp::new(dec!(1), dec!(2), 0, HOUR);

        let cross = intersection(&[buy], &[sell]).unwrap();
        assert_eq!(cross.timestamp, HOUR / 2);
        assert_eq!(cross.price, dec!(1.5));
    }

    #[test]
    fn test_crossing_rounds_up_to_whole_ms() {
        // Zero lands at 1000/3 ms
        let sell = PriceRamp::new(dec!(1), dec!(1), 0, 1_000);
        let buy = PriceRamp::new(dec!(0), dec!(3), 0, 1_000);

        let cross = intersection(&[buy], &[sell]).unwrap();
        assert_eq!(cross.timestamp, 334);
        assert!(buy.price_at(cross.timestamp) >= sell.price_at(cross.timestamp));
        assert!(buy.price_at(cross.timestamp - 1) < sell.price_at(cross.timestamp - 1));
    }

    #[test]
    fn test_disjoint_windows() {
        let sell = PriceRamp::constant(dec!(1), 0, 1_000);
        let buy = PriceRamp::constant(dec!(5), 1_001, 2_000);
        assert!(intersection(&[buy], &[sell]).is_none());
    }

    #[test]
    fn test_touching_windows_are_inclusive() {
        let sell = PriceRamp::constant(dec!(1), 0, 1_000);
        let buy = PriceRamp::constant(dec!(1), 1_000, 2_000);

        let cross = intersection(&[buy], &[sell]).unwrap();
        assert_eq!(cross.timestamp, 1_000);
    }

    #[test]
    fn test_bundle_sums_listings() {
        // Offer of 2.5 for three listings at 1 each only clears once a listing decays
        let buy = PriceRamp::constant(dec!(2.5), 0, HOUR);
        let a = PriceRamp::constant(dec!(1), 0, HOUR);
        let b = PriceRamp::constant(dec!(1), 0, HOUR);
        let c = PriceRamp::new(dec!(1), dec!(0), 0, HOUR);

        let cross = intersection(&[buy], &[a, b, c]).unwrap();
        assert_eq!(cross.timestamp, HOUR / 2);
        assert_eq!(cross.price, dec!(2.5));

        assert!(intersection(&[buy], &[a, b, PriceRamp::constant(dec!(1), 0, HOUR)]).is_none());
    }

    #[test]
    fn test_breakpoint_inside_window() {
        // Listing decays until 600 then stays flat at 1; offer flat at 1
        let sell = PriceRamp::new(dec!(2), dec!(1), 0, 600);
        let buy = PriceRamp::constant(dec!(1), 0, 1_000);

        let cross = intersection(&[buy], &[sell]).unwrap();
        assert_eq!(cross.timestamp, 600);
        assert_eq!(cross.price, dec!(1));
    }

    #[test]
    fn test_format_eth() {
        assert_eq!(format_eth(dec!(0.100)), "0.1");
        assert_eq!(format_eth(dec!(2)), "2");
    }
}
