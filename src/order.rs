//! Order records and their pool handles.

use crate::pool::PoolKey;
use crate::types::{OrderId, Price, Quantity, Side};

/// Handle to an [`Order`] slot in the order pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrderKey(u32);

impl PoolKey for OrderKey {
    #[inline]
    fn from_slot(slot: usize) -> Self {
        OrderKey(slot as u32)
    }

    #[inline]
    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// A limit order record.
///
/// `id`, `side` and `price` never change after creation. `quantity` only
/// decreases, and reaches zero exactly when the order is fully filled.
/// `prev`/`next` link the order into its price level's FIFO queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    price: Price,
    pub(crate) quantity: Quantity,
    side: Side,
    pub(crate) prev: Option<OrderKey>,
    pub(crate) next: Option<OrderKey>,
}

impl Order {
    pub(crate) fn new(id: OrderId, price: Price, quantity: Quantity, side: Side) -> Self {
        Self {
            id,
            price,
            quantity,
            side,
            prev: None,
            next: None,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Remaining (unfilled) quantity.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

/// An order record acquired by [`crate::OrderBook::create_order`] that has not
/// been submitted yet.
///
/// Not `Clone`: passing it to [`crate::OrderBook::add_order`] moves the record
/// into the book, and [`crate::OrderBook::discard_order`] returns it to the pool.
/// Only the book that created it accepts it.
#[derive(Debug)]
#[must_use = "a pending order holds a pool slot until it is added or discarded"]
pub struct PendingOrder {
    pub(crate) book_id: u64,
    pub(crate) key: OrderKey,
    id: OrderId,
    price: Price,
    quantity: Quantity,
    side: Side,
}

impl PendingOrder {
    pub(crate) fn new(book_id: u64, key: OrderKey, order: &Order) -> Self {
        Self {
            book_id,
            key,
            id: order.id,
            price: order.price,
            quantity: order.quantity,
            side: order.side,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn side(&self) -> Side {
        self.side
    }
}
