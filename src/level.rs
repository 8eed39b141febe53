//! Price level: every resting order at one exact price, in arrival order.
//!
//! The queue is intrusive: each [`Order`] carries its own `prev`/`next`
//! handles, so unlinking never searches.

use crate::order::{Order, OrderKey};
use crate::pool::{Pool, PoolKey};
use crate::types::Price;

/// Handle to a [`Limit`] slot in the level pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LimitKey(u32);

impl PoolKey for LimitKey {
    #[inline]
    fn from_slot(slot: usize) -> Self {
        LimitKey(slot as u32)
    }

    #[inline]
    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// One price level.
///
/// `total_volume` is the sum of `quantity` over the linked orders and
/// `order_count` is the queue length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limit {
    price: Price,
    pub(crate) total_volume: u64,
    order_count: u32,
    pub(crate) head: Option<OrderKey>,
    tail: Option<OrderKey>,
}

impl Limit {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            total_volume: 0,
            order_count: 0,
            head: None,
            tail: None,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    pub fn order_count(&self) -> u32 {
        self.order_count
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Appends `key` at the tail (lowest time priority).
    pub fn push_back(&mut self, key: OrderKey, orders: &mut Pool<OrderKey, Order>) {
        let quantity = {
            let order = &mut orders[key];
            order.prev = self.tail;
            order.next = None;
            order.quantity
        };
        match self.tail {
            Some(tail) => orders[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        self.total_volume += u64::from(quantity);
        self.order_count += 1;
    }

    /// Removes `key` from wherever it sits in the queue.
    ///
    /// The order's remaining quantity is subtracted from the level volume, so a
    /// fully filled order (quantity already zero) leaves the volume as is.
    pub fn unlink(&mut self, key: OrderKey, orders: &mut Pool<OrderKey, Order>) {
        let (prev, next, quantity) = {
            let order = &mut orders[key];
            (order.prev.take(), order.next.take(), order.quantity)
        };
        match prev {
            Some(prev) => orders[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => orders[next].prev = prev,
            None => self.tail = prev,
        }
        self.total_volume -= u64::from(quantity);
        self.order_count -= 1;
    }

    /// Iterates resting orders from head to tail.
    pub fn iter<'a>(&self, orders: &'a Pool<OrderKey, Order>) -> LevelIter<'a> {
        LevelIter {
            cursor: self.head,
            orders,
        }
    }
}

/// FIFO iterator over one level's orders.
pub struct LevelIter<'a> {
    cursor: Option<OrderKey>,
    orders: &'a Pool<OrderKey, Order>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = &'a Order;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let order = &self.orders[key];
        self.cursor = order.next;
        Some(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderId, Side};

    fn pool() -> Pool<OrderKey, Order> {
        Pool::with_capacity("order", 8)
    }

    fn add(level: &mut Limit, orders: &mut Pool<OrderKey, Order>, id: u64, qty: u32) -> OrderKey {
        let key = orders
            .acquire(Order::new(OrderId(id), level.price(), qty, Side::Buy))
            .unwrap();
        level.push_back(key, orders);
        key
    }

    fn ids(level: &Limit, orders: &Pool<OrderKey, Order>) -> Vec<u64> {
        level.iter(orders).map(|o| o.id().0).collect()
    }

    #[test]
    fn push_back_keeps_arrival_order_and_totals() {
        let mut orders = pool();
        let mut level = Limit::new(10000);
        add(&mut level, &mut orders, 1, 10);
        add(&mut level, &mut orders, 2, 20);
        add(&mut level, &mut orders, 3, 5);
        assert_eq!(ids(&level, &orders), vec![1, 2, 3]);
        assert_eq!(level.total_volume(), 35);
        assert_eq!(level.order_count(), 3);
    }

    #[test]
    fn unlink_middle_head_and_tail() {
        let mut orders = pool();
        let mut level = Limit::new(10000);
        let a = add(&mut level, &mut orders, 1, 10);
        let b = add(&mut level, &mut orders, 2, 20);
        let c = add(&mut level, &mut orders, 3, 30);

        level.unlink(b, &mut orders);
        assert_eq!(ids(&level, &orders), vec![1, 3]);
        assert_eq!(level.total_volume(), 40);

        level.unlink(a, &mut orders);
        assert_eq!(ids(&level, &orders), vec![3]);
        assert_eq!(level.head, Some(c));

        level.unlink(c, &mut orders);
        assert!(level.is_empty());
        assert_eq!(level.total_volume(), 0);
        assert!(level.head.is_none());
        assert!(level.tail.is_none());
    }

    #[test]
    fn unlinked_order_can_be_requeued_at_tail() {
        let mut orders = pool();
        let mut level = Limit::new(10000);
        let a = add(&mut level, &mut orders, 1, 10);
        add(&mut level, &mut orders, 2, 10);
        level.unlink(a, &mut orders);
        level.push_back(a, &mut orders);
        assert_eq!(ids(&level, &orders), vec![2, 1]);
    }

    #[test]
    fn unlink_after_fill_does_not_double_count() {
        let mut orders = pool();
        let mut level = Limit::new(10000);
        let a = add(&mut level, &mut orders, 1, 10);
        add(&mut level, &mut orders, 2, 10);
        orders[a].quantity = 0;
        level.total_volume -= 10;
        level.unlink(a, &mut orders);
        assert_eq!(level.total_volume(), 10);
        assert_eq!(level.order_count(), 1);
    }
}
