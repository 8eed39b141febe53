//! # Limit Book
//!
//! Single-instrument limit order book: price-time priority matching over
//! fixed-capacity pools, with no allocation on the submit/cancel hot path.
//!
//! ## Entry point
//!
//! Use [`OrderBook`] directly: build one with [`OrderBook::new`], take an order
//! record with [`OrderBook::create_order`], hand it to [`OrderBook::add_order`]
//! (or do both with [`OrderBook::submit`]), and remove resting orders with
//! [`OrderBook::cancel_order`].
//!
//! ## Example
//!
//! ```rust
//! use limit_book::{BookConfig, OrderBook, OrderId, Side};
//!
//! let mut book = OrderBook::new(BookConfig::with_order_capacity(1024)).unwrap();
//! book.submit(OrderId(1), 10050, 10, Side::Buy).unwrap();
//! let outcome = book.submit(OrderId(2), 10050, 4, Side::Sell).unwrap();
//! assert_eq!(outcome.filled_quantity, 4);
//! assert_eq!(book.volume_at_price(Side::Buy, 10050), 6);
//! assert!(!book.cancel_order(OrderId(2)));
//! ```
//!
//! ## Building blocks
//!
//! [`pool::Pool`], [`order_index::OrderIndex`], [`price_levels::PriceLevels`]
//! and [`level::Limit`] are public for hosts that want the pieces on their own.

pub mod config;
pub mod error;
pub mod level;
pub mod matching;
pub mod order;
pub mod order_book;
pub mod order_gen;
pub mod order_index;
pub mod pool;
pub mod price_levels;
pub mod types;

pub use config::BookConfig;
pub use error::BookError;
pub use order::{Order, PendingOrder};
pub use order_book::{AddOutcome, BookSnapshot, DepthLevel, OrderBook};
pub use order_gen::{replay_into_book, BookCommand, Generator, GeneratorConfig, ReplayStats};
pub use types::{OrderId, Price, Quantity, Side, NO_PRICE};
