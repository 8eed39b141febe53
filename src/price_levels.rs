//! Per-side price → level index.
//!
//! A flat array of `(price, level)` pairs sorted so the best price is always
//! the last element: ascending for bids, descending for asks. Best-of-book is
//! a single index read. Inserting or removing a level shifts the suffix after
//! it in one bulk move; the number of distinct levels stays small next to the
//! number of orders, so this beats a tree for the operations that matter.

use crate::error::BookError;
use crate::level::LimitKey;
use crate::types::{Price, Side};

/// Below this many levels a linear scan is cheaper than binary search.
const LINEAR_SCAN_MAX: usize = 16;

#[derive(Debug)]
pub struct PriceLevels {
    side: Side,
    prices: Vec<Price>,
    levels: Vec<LimitKey>,
    capacity: usize,
}

impl PriceLevels {
    pub fn new(side: Side, capacity: usize) -> Self {
        Self {
            side,
            prices: Vec::with_capacity(capacity),
            levels: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.prices.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn best_price(&self) -> Option<Price> {
        self.prices.last().copied()
    }

    #[inline]
    pub fn best_level(&self) -> Option<LimitKey> {
        self.levels.last().copied()
    }

    #[inline]
    pub fn best(&self) -> Option<(Price, LimitKey)> {
        Some((*self.prices.last()?, *self.levels.last()?))
    }

    /// First position whose price does not rank below `price`.
    #[inline]
    fn lower_bound(&self, price: Price) -> usize {
        let side = self.side;
        self.prices.partition_point(|&p| side.ranks_below(p, price))
    }

    fn position(&self, price: Price) -> Option<usize> {
        if self.prices.len() < LINEAR_SCAN_MAX {
            return self.prices.iter().position(|&p| p == price);
        }
        let idx = self.lower_bound(price);
        (self.prices.get(idx) == Some(&price)).then_some(idx)
    }

    pub fn level_at(&self, price: Price) -> Option<LimitKey> {
        self.position(price).map(|idx| self.levels[idx])
    }

    pub fn contains(&self, price: Price) -> bool {
        self.position(price).is_some()
    }

    /// Returns the level at `price`, or inserts the one built by `create`.
    ///
    /// `create` is only called when the price is new and the index has room;
    /// an error from it leaves the index unchanged.
    pub fn get_or_create_level(
        &mut self,
        price: Price,
        create: impl FnOnce() -> Result<LimitKey, BookError>,
    ) -> Result<LimitKey, BookError> {
        let idx = self.lower_bound(price);
        if self.prices.get(idx) == Some(&price) {
            return Ok(self.levels[idx]);
        }
        if self.is_full() {
            return Err(BookError::PriceLevelsExhausted {
                side: self.side,
                capacity: self.capacity,
            });
        }
        let key = create()?;
        self.prices.insert(idx, price);
        self.levels.insert(idx, key);
        Ok(key)
    }

    /// Removes the level at `price` and returns its handle.
    pub fn remove_level(&mut self, price: Price) -> Option<LimitKey> {
        let idx = self.position(price)?;
        self.prices.remove(idx);
        Some(self.levels.remove(idx))
    }

    /// Removes the best level.
    #[inline]
    pub fn pop_best(&mut self) -> Option<(Price, LimitKey)> {
        Some((self.prices.pop()?, self.levels.pop()?))
    }

    /// Levels from best to worst.
    pub fn iter_best_first(&self) -> impl Iterator<Item = (Price, LimitKey)> + '_ {
        self.prices
            .iter()
            .rev()
            .copied()
            .zip(self.levels.iter().rev().copied())
    }
}
