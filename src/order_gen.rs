//! Synthetic order flow.
//!
//! Deterministic, configurable stream of submits and cancels for replay tests,
//! the demo binary, and benchmarks. Same seed ⇒ same sequence of commands.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::BookError;
use crate::order_book::OrderBook;
use crate::types::{OrderId, Price, Quantity, Side};

/// One instruction for the book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BookCommand {
    Submit {
        id: OrderId,
        price: Price,
        quantity: Quantity,
        side: Side,
    },
    Cancel {
        id: OrderId,
    },
}

/// Configuration for the generator. Ranges are inclusive.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed ⇒ same command stream.
    pub seed: u64,
    /// Number of commands produced by [`Generator::all_commands`].
    pub num_commands: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    /// Probability that a command cancels an earlier submit instead of submitting.
    pub cancel_ratio: f64,
    /// Price range in ticks.
    pub price_min: Price,
    pub price_max: Price,
    /// Quantity range.
    pub quantity_min: Quantity,
    pub quantity_max: Quantity,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_commands: 1000,
            buy_ratio: 0.5,
            cancel_ratio: 0.2,
            price_min: 9_950,
            price_max: 10_050,
            quantity_min: 1,
            quantity_max: 100,
        }
    }
}

/// Deterministic command stream. Order ids count up from 1.
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_order_id: u64,
}

impl Generator {
    /// Range bounds are reordered if given backwards and raised to at least 1,
    /// so every generated submit is valid.
    pub fn new(mut config: GeneratorConfig) -> Self {
        let (lo, hi) = ordered(config.price_min, config.price_max);
        config.price_min = lo;
        config.price_max = hi;
        let (lo, hi) = ordered(config.quantity_min, config.quantity_max);
        config.quantity_min = lo;
        config.quantity_max = hi;
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_order_id: 1,
        }
    }

    /// Generates the next command. Cancels target a uniformly chosen earlier
    /// id, which may already be filled or canceled.
    pub fn next_command(&mut self) -> BookCommand {
        if self.next_order_id > 1 && self.rng.gen::<f64>() < self.config.cancel_ratio {
            let id = self.rng.gen_range(1..self.next_order_id);
            return BookCommand::Cancel { id: OrderId(id) };
        }
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        let price = self
            .rng
            .gen_range(self.config.price_min..=self.config.price_max);
        let quantity = self
            .rng
            .gen_range(self.config.quantity_min..=self.config.quantity_max);
        BookCommand::Submit {
            id,
            price,
            quantity,
            side,
        }
    }

    pub fn take_commands(&mut self, n: usize) -> Vec<BookCommand> {
        (0..n).map(|_| self.next_command()).collect()
    }

    /// The full stream as defined by `config.num_commands`.
    pub fn all_commands(&mut self) -> Vec<BookCommand> {
        self.take_commands(self.config.num_commands)
    }
}

fn ordered<T: Ord + From<u8>>(a: T, b: T) -> (T, T) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (lo.max(T::from(1)), hi.max(T::from(1)))
}

/// Totals from [`replay_into_book`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReplayStats {
    pub submitted: usize,
    pub filled_quantity: u64,
    pub rested: usize,
    pub canceled: usize,
    pub cancel_misses: usize,
}

/// Applies `commands` in order. Stops at the first rejected submit.
pub fn replay_into_book(
    book: &mut OrderBook,
    commands: impl IntoIterator<Item = BookCommand>,
) -> Result<ReplayStats, BookError> {
    let mut stats = ReplayStats::default();
    for command in commands {
        match command {
            BookCommand::Submit {
                id,
                price,
                quantity,
                side,
            } => {
                let outcome = book.submit(id, price, quantity, side)?;
                stats.submitted += 1;
                stats.filled_quantity += u64::from(outcome.filled_quantity);
                if outcome.is_resting() {
                    stats.rested += 1;
                }
            }
            BookCommand::Cancel { id } => {
                if book.cancel_order(id) {
                    stats.canceled += 1;
                } else {
                    stats.cancel_misses += 1;
                }
            }
        }
    }
    Ok(stats)
}
