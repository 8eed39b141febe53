//! Price-time priority matching.
//!
//! The incoming order walks the opposite side from its best level outward,
//! consuming each level's queue from the head. Fully filled resting orders
//! are unlinked, dropped from the id index and recycled as they go; a level
//! whose queue drains is removed and recycled before the next level is
//! inspected, so the book is consistent after every step.

use log::trace;

use crate::error::BookError;
use crate::level::Limit;
use crate::order::OrderKey;
use crate::order_book::OrderBook;
use crate::types::{Quantity, Side};

impl OrderBook {
    /// Matches the order at `key` against the opposite side and writes its
    /// remaining quantity back. Returns the quantity filled.
    pub(crate) fn match_incoming(&mut self, key: OrderKey) -> Quantity {
        let (id, side, price, start) = {
            let order = &self.orders[key];
            (order.id(), order.side(), order.price(), order.quantity())
        };
        let opposite = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        let mut remaining = start;
        while remaining > 0 {
            let Some((level_price, level_key)) = opposite.best() else {
                break;
            };
            if !side.crosses(price, level_price) {
                break;
            }

            let level = &mut self.limits[level_key];
            let mut cursor = level.head;
            while remaining > 0 {
                let Some(resting_key) = cursor else {
                    break;
                };
                let resting = &mut self.orders[resting_key];
                let fill = remaining.min(resting.quantity);
                resting.quantity -= fill;
                remaining -= fill;
                level.total_volume -= u64::from(fill);
                trace!(
                    "fill incoming_order_id={} resting_order_id={} price={} quantity={}",
                    id,
                    resting.id(),
                    level_price,
                    fill
                );
                if resting.quantity > 0 {
                    break;
                }

                let (resting_id, next) = (resting.id(), resting.next);
                level.unlink(resting_key, &mut self.orders);
                self.index.erase(resting_id);
                self.orders.release(resting_key);
                cursor = next;
            }

            if level.is_empty() {
                opposite.pop_best();
                self.limits.release(level_key);
            }
        }

        self.orders[key].quantity = remaining;
        start - remaining
    }

    /// Inserts the order at `key` on its own side and registers it in the id index.
    pub(crate) fn rest(&mut self, key: OrderKey) -> Result<(), BookError> {
        let (id, side, price) = {
            let order = &self.orders[key];
            (order.id(), order.side(), order.price())
        };
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let limits = &mut self.limits;
        let level_key = levels.get_or_create_level(price, || limits.acquire(Limit::new(price)))?;
        self.limits[level_key].push_back(key, &mut self.orders);
        self.index.insert(id, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BookConfig;
    use crate::order_book::OrderBook;
    use crate::types::{OrderId, Side};

    fn book() -> OrderBook {
        let _ = env_logger::try_init();
        OrderBook::new(BookConfig::with_order_capacity(64)).unwrap()
    }

    #[test]
    fn non_crossing_order_does_not_match() {
        let mut book = book();
        book.submit(OrderId(1), 10001, 10, Side::Sell).unwrap();
        let outcome = book.submit(OrderId(2), 10000, 10, Side::Buy).unwrap();
        assert_eq!(outcome.filled_quantity, 0);
        assert_eq!(book.best_bid(), Some(10000));
        assert_eq!(book.best_ask(), Some(10001));
    }

    #[test]
    fn sell_walks_bids_from_highest() {
        let mut book = book();
        book.submit(OrderId(1), 10000, 5, Side::Buy).unwrap();
        book.submit(OrderId(2), 10050, 5, Side::Buy).unwrap();
        book.submit(OrderId(3), 10020, 5, Side::Buy).unwrap();
        let outcome = book.submit(OrderId(4), 10010, 12, Side::Sell).unwrap();
        assert_eq!(outcome.filled_quantity, 10);
        assert_eq!(outcome.remaining_quantity, 2);
        assert!(book.resting_order(OrderId(2)).is_none());
        assert!(book.resting_order(OrderId(3)).is_none());
        assert_eq!(book.best_bid(), Some(10000));
        assert_eq!(book.best_ask(), Some(10010));
    }

    #[test]
    fn exact_fill_drains_level_and_recycles_it() {
        let mut book = book();
        let free_levels = book.free_level_slots();
        book.submit(OrderId(1), 10000, 5, Side::Sell).unwrap();
        book.submit(OrderId(2), 10000, 5, Side::Sell).unwrap();
        assert_eq!(book.free_level_slots(), free_levels - 1);
        let outcome = book.submit(OrderId(3), 10000, 10, Side::Buy).unwrap();
        assert!(outcome.is_filled());
        assert_eq!(book.level_count(Side::Sell), 0);
        assert_eq!(book.free_level_slots(), free_levels);
        assert_eq!(book.free_order_slots(), 64);
    }

    #[test]
    fn fill_quantities_are_conserved() {
        let mut book = book();
        book.submit(OrderId(1), 10100, 7, Side::Sell).unwrap();
        book.submit(OrderId(2), 10100, 3, Side::Sell).unwrap();
        book.submit(OrderId(3), 10200, 9, Side::Sell).unwrap();
        let before = book.volume_at_price(Side::Sell, 10100) + book.volume_at_price(Side::Sell, 10200);
        let outcome = book.submit(OrderId(4), 10200, 15, Side::Buy).unwrap();
        let after = book.volume_at_price(Side::Sell, 10100) + book.volume_at_price(Side::Sell, 10200);
        assert_eq!(u64::from(outcome.filled_quantity), before - after);
        assert_eq!(book.resting_order(OrderId(3)).unwrap().quantity(), 4);
    }
}
