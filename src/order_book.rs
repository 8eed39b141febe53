//! Single-instrument order book: bids and asks, price-time priority.
//!
//! Orders and price levels live in fixed-capacity pools and are addressed by
//! handle. Each side keeps a flat sorted price index with the best level last,
//! and an open-addressing index maps order ids to their records for cancels.
//! Matching itself lives in [`crate::matching`].

use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace, warn};

use crate::config::BookConfig;
use crate::error::BookError;
use crate::level::{Limit, LimitKey};
use crate::order::{Order, OrderKey, PendingOrder};
use crate::order_index::OrderIndex;
use crate::pool::Pool;
use crate::price_levels::PriceLevels;
use crate::types::{OrderId, Price, Quantity, Side, NO_PRICE};

/// Source of [`OrderBook`] identities; pending orders carry their book's.
static NEXT_BOOK_ID: AtomicU64 = AtomicU64::new(1);

/// What happened to a submitted order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AddOutcome {
    pub order_id: OrderId,
    /// Quantity matched against resting orders during this call.
    pub filled_quantity: Quantity,
    /// Quantity left resting in the book (zero when fully filled).
    pub remaining_quantity: Quantity,
}

impl AddOutcome {
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    pub fn is_resting(&self) -> bool {
        self.remaining_quantity > 0
    }
}

/// Aggregate view of one price level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DepthLevel {
    pub price: Price,
    pub volume: u64,
    pub order_count: u32,
}

/// Top-of-book levels for both sides, best first.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
    pub order_count: usize,
}

/// Single-instrument limit order book.
///
/// All operations run to completion on `&mut self`; a host that shares the
/// book across threads wraps the whole value in one lock.
#[derive(Debug)]
pub struct OrderBook {
    id: u64,
    config: BookConfig,
    pub(crate) orders: Pool<OrderKey, Order>,
    pub(crate) limits: Pool<LimitKey, Limit>,
    pub(crate) bids: PriceLevels,
    pub(crate) asks: PriceLevels,
    pub(crate) index: OrderIndex,
}

impl OrderBook {
    /// Builds a book with every pool and index sized from `config`.
    pub fn new(config: BookConfig) -> Result<Self, BookError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Book sized with [`BookConfig::default`].
    pub fn with_defaults() -> Self {
        Self::build(BookConfig::default())
    }

    fn build(config: BookConfig) -> Self {
        debug!(
            "order book created order_capacity={} level_capacity={} max_levels_per_side={} order_index_capacity={}",
            config.order_capacity,
            config.level_capacity,
            config.max_levels_per_side,
            config.order_index_capacity
        );
        Self {
            id: NEXT_BOOK_ID.fetch_add(1, Ordering::Relaxed),
            orders: Pool::with_capacity("order", config.order_capacity),
            limits: Pool::with_capacity("level", config.level_capacity),
            bids: PriceLevels::new(Side::Buy, config.max_levels_per_side),
            asks: PriceLevels::new(Side::Sell, config.max_levels_per_side),
            index: OrderIndex::with_capacity(config.order_index_capacity),
            config,
        }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Takes an order record from the pool. The order is not in the book yet;
    /// pass it to [`OrderBook::add_order`] or [`OrderBook::discard_order`].
    pub fn create_order(
        &mut self,
        id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> Result<PendingOrder, BookError> {
        if quantity == 0 {
            warn!("order rejected order_id={} reason=zero_quantity", id);
            return Err(BookError::ZeroQuantity);
        }
        if price == NO_PRICE {
            warn!("order rejected order_id={} reason=zero_price", id);
            return Err(BookError::ZeroPrice);
        }
        let order = Order::new(id, price, quantity, side);
        let key = self.orders.acquire(order).map_err(|err| {
            warn!("order rejected order_id={} reason={}", id, err);
            err
        })?;
        Ok(PendingOrder::new(self.id, key, &self.orders[key]))
    }

    /// Returns an unsubmitted order record to the pool. A pending order from
    /// another book is ignored.
    pub fn discard_order(&mut self, pending: PendingOrder) {
        if pending.book_id != self.id {
            warn!("discard ignored order_id={} reason=foreign_order", pending.id());
            return;
        }
        self.orders.release(pending.key);
    }

    /// Matches the order against the opposite side and rests any remainder.
    ///
    /// On error the book is unchanged and the order record is returned to the
    /// pool. A pending order created by another book is rejected with
    /// [`BookError::ForeignOrder`] and its record stays with that book.
    pub fn add_order(&mut self, pending: PendingOrder) -> Result<AddOutcome, BookError> {
        if pending.book_id != self.id {
            warn!("order rejected order_id={} reason=foreign_order", pending.id());
            return Err(BookError::ForeignOrder(pending.id()));
        }
        let key = pending.key;
        let (id, side, price, quantity) = (
            pending.id(),
            pending.side(),
            pending.price(),
            pending.quantity(),
        );
        debug!(
            "order submitted order_id={} side={} price={} quantity={}",
            id, side, price, quantity
        );

        if self.index.contains(id) {
            self.orders.release(key);
            warn!("order rejected order_id={} reason=duplicate_id", id);
            return Err(BookError::DuplicateOrderId(id));
        }
        if let Err(err) = self.check_rest_capacity(side, price, quantity) {
            self.orders.release(key);
            warn!("order rejected order_id={} reason={}", id, err);
            return Err(err);
        }

        let filled = self.match_incoming(key);
        let remaining = quantity - filled;
        if remaining > 0 {
            if let Err(err) = self.rest(key) {
                self.orders.release(key);
                return Err(err);
            }
            debug!(
                "order rested order_id={} price={} filled={} remaining={}",
                id, price, filled, remaining
            );
        } else {
            self.orders.release(key);
            debug!("order filled order_id={} filled={}", id, filled);
        }

        Ok(AddOutcome {
            order_id: id,
            filled_quantity: filled,
            remaining_quantity: remaining,
        })
    }

    /// [`OrderBook::create_order`] followed by [`OrderBook::add_order`].
    pub fn submit(
        &mut self,
        id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
    ) -> Result<AddOutcome, BookError> {
        let pending = self.create_order(id, price, quantity, side)?;
        self.add_order(pending)
    }

    /// Removes a resting order. Returns `false`, and changes nothing, when the
    /// id is unknown, already filled, or already canceled.
    pub fn cancel_order(&mut self, id: OrderId) -> bool {
        let Some(key) = self.index.find(id) else {
            trace!("cancel ignored order_id={} reason=not_resting", id);
            return false;
        };
        let (side, price) = {
            let order = &self.orders[key];
            (order.side(), order.price())
        };
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level_key = levels.level_at(price);
        debug_assert!(level_key.is_some(), "resting order {} has no level at {}", id, price);
        match level_key {
            Some(level_key) => {
                let level = &mut self.limits[level_key];
                level.unlink(key, &mut self.orders);
                if level.is_empty() {
                    levels.remove_level(price);
                    self.limits.release(level_key);
                }
            }
            None => warn!("cancel found no level order_id={} side={} price={}", id, side, price),
        }
        self.index.erase(id);
        self.orders.release(key);
        debug!("order canceled order_id={} side={} price={}", id, side, price);
        true
    }

    /// Fails when the order could need a new level on its own side that
    /// cannot be created, unless the opposite side can fill it completely.
    ///
    /// A full level pool is not a shortage when matching will drain the best
    /// opposing level, since that frees a level record before the remainder rests.
    fn check_rest_capacity(
        &self,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Result<(), BookError> {
        let own = self.levels(side);
        if own.contains(price) {
            return Ok(());
        }
        let shortage = if own.is_full() {
            Some(BookError::PriceLevelsExhausted {
                side,
                capacity: own.capacity(),
            })
        } else if self.limits.is_full() && !self.drains_best_opposing_level(side, price, quantity) {
            Some(BookError::PoolExhausted {
                pool: "level",
                capacity: self.limits.capacity(),
            })
        } else {
            None
        };
        match shortage {
            Some(err) if self.crossable_volume(side, price, quantity) < u64::from(quantity) => Err(err),
            _ => Ok(()),
        }
    }

    /// Whether an order at `price` for `quantity` crosses the best opposing
    /// level and takes all of its volume.
    fn drains_best_opposing_level(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        self.levels(side.opposite())
            .best()
            .is_some_and(|(level_price, level_key)| {
                side.crosses(price, level_price)
                    && self.limits[level_key].total_volume() <= u64::from(quantity)
            })
    }

    /// Opposite-side volume an order at `price` could trade against, counted
    /// until it reaches `cap`.
    fn crossable_volume(&self, side: Side, price: Price, cap: Quantity) -> u64 {
        let mut total = 0u64;
        for (level_price, level_key) in self.levels(side.opposite()).iter_best_first() {
            if !side.crosses(price, level_price) || total >= u64::from(cap) {
                break;
            }
            total += self.limits[level_key].total_volume();
        }
        total
    }

    pub(crate) fn levels(&self, side: Side) -> &PriceLevels {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// Best (highest) bid, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Best (lowest) ask, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Best bid or [`NO_PRICE`] when there are no bids.
    pub fn best_bid_price(&self) -> Price {
        self.best_bid().unwrap_or(NO_PRICE)
    }

    /// Best ask or [`NO_PRICE`] when there are no asks.
    pub fn best_ask_price(&self) -> Price {
        self.best_ask().unwrap_or(NO_PRICE)
    }

    pub fn spread(&self) -> Option<Price> {
        self.best_ask()?.checked_sub(self.best_bid()?)
    }

    /// Resting volume at exactly `price`, or 0 if there is no such level.
    pub fn volume_at_price(&self, side: Side, price: Price) -> u64 {
        self.levels(side)
            .level_at(price)
            .map_or(0, |key| self.limits[key].total_volume())
    }

    /// Number of resting orders.
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn level_count(&self, side: Side) -> usize {
        self.levels(side).len()
    }

    pub fn resting_order(&self, id: OrderId) -> Option<&Order> {
        self.index.find(id).map(|key| &self.orders[key])
    }

    /// Resting orders at `price` in time priority.
    pub fn orders_at_price(&self, side: Side, price: Price) -> Vec<&Order> {
        match self.levels(side).level_at(price) {
            Some(key) => self.limits[key].iter(&self.orders).collect(),
            None => Vec::new(),
        }
    }

    /// Up to `max_levels` levels of one side, best first.
    pub fn depth(&self, side: Side, max_levels: usize) -> Vec<DepthLevel> {
        self.levels(side)
            .iter_best_first()
            .take(max_levels)
            .map(|(price, key)| {
                let level = &self.limits[key];
                DepthLevel {
                    price,
                    volume: level.total_volume(),
                    order_count: level.order_count(),
                }
            })
            .collect()
    }

    pub fn snapshot(&self, max_levels: usize) -> BookSnapshot {
        BookSnapshot {
            bids: self.depth(Side::Buy, max_levels),
            asks: self.depth(Side::Sell, max_levels),
            order_count: self.order_count(),
        }
    }

    pub fn free_order_slots(&self) -> usize {
        self.orders.free()
    }

    pub fn free_level_slots(&self) -> usize {
        self.limits.free()
    }
}
