//! Core scalar types for the book.
//!
//! Prices are integer ticks (fixed-point, e.g. cents) and quantities are whole
//! units. Nothing in matching touches floating point.

use rust_decimal::Decimal;

/// Price in ticks. `0` is reserved as the "no price" sentinel.
pub type Price = u64;

/// Order quantity in whole units.
pub type Quantity = u32;

/// Returned by [`crate::OrderBook::best_bid_price`] and
/// [`crate::OrderBook::best_ask_price`] when the side is empty.
pub const NO_PRICE: Price = 0;

/// Caller-assigned order identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether an incoming order on this side at `limit` can trade against a
    /// resting level at `resting`.
    #[inline]
    pub fn crosses(self, limit: Price, resting: Price) -> bool {
        match self {
            Side::Buy => limit >= resting,
            Side::Sell => limit <= resting,
        }
    }

    /// Whether `a` has strictly lower priority than `b` on this side.
    /// Bids rank higher prices first, asks rank lower prices first.
    #[inline]
    pub(crate) fn ranks_below(self, a: Price, b: Price) -> bool {
        match self {
            Side::Buy => a < b,
            Side::Sell => a > b,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Converts a tick price to a decimal with `scale` fractional digits, for display.
///
/// ```rust
/// use limit_book::types::ticks_to_decimal;
/// assert_eq!(ticks_to_decimal(10050, 2).to_string(), "100.50");
/// ```
pub fn ticks_to_decimal(price: Price, scale: u32) -> Decimal {
    Decimal::from_i128_with_scale(price as i128, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_crosses_at_or_above_ask() {
        assert!(Side::Buy.crosses(10001, 10001));
        assert!(Side::Buy.crosses(10002, 10001));
        assert!(!Side::Buy.crosses(10000, 10001));
    }

    #[test]
    fn sell_crosses_at_or_below_bid() {
        assert!(Side::Sell.crosses(10000, 10000));
        assert!(Side::Sell.crosses(9999, 10000));
        assert!(!Side::Sell.crosses(10001, 10000));
    }

    #[test]
    fn ranking_puts_best_last() {
        assert!(Side::Buy.ranks_below(100, 101));
        assert!(Side::Sell.ranks_below(101, 100));
        assert!(!Side::Buy.ranks_below(100, 100));
    }

    #[test]
    fn ticks_to_decimal_keeps_scale() {
        assert_eq!(ticks_to_decimal(10001, 2).to_string(), "100.01");
        assert_eq!(ticks_to_decimal(7, 0).to_string(), "7");
    }
}
