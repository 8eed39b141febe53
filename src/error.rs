//! Book error type.

use crate::types::{OrderId, Side};
use thiserror::Error;

/// Errors returned by [`crate::OrderBook`] and its configuration.
///
/// Unknown or already-filled ids on cancel are not errors; see
/// [`crate::OrderBook::cancel_order`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// A record pool has no free slots left.
    #[error("{pool} pool exhausted (capacity {capacity})")]
    PoolExhausted { pool: &'static str, capacity: usize },

    /// The side's price-level index is full and the order needs a new level.
    #[error("{side} price levels exhausted (capacity {capacity})")]
    PriceLevelsExhausted { side: Side, capacity: usize },

    #[error("order quantity must be greater than zero")]
    ZeroQuantity,

    #[error("order price must be greater than zero")]
    ZeroPrice,

    /// An order with this id is still resting in the book.
    #[error("order {0} is already resting in the book")]
    DuplicateOrderId(OrderId),

    /// The pending order was created by a different book.
    #[error("order {0} was created by another book")]
    ForeignOrder(OrderId),

    #[error("invalid book config: {0}")]
    InvalidConfig(String),
}
