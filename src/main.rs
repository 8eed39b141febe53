//! Demo driver for the order book.
//!
//! Walks through a partial fill, a sweep across price levels, and a cancel,
//! then replays a generated order stream and prints the resulting depth as
//! JSON. Book sizing comes from `BOOK_CONFIG` (path to a JSON file) or the
//! `BOOK_*` environment variables.

use limit_book::types::ticks_to_decimal;
use limit_book::{
    replay_into_book, BookConfig, BookError, Generator, GeneratorConfig, OrderBook, OrderId, Side,
};
use log::info;

fn load_config() -> Result<BookConfig, BookError> {
    match std::env::var("BOOK_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| BookError::InvalidConfig(format!("{}: {}", path, e)))?;
            BookConfig::from_json(&json)
        }
        Err(_) => BookConfig::from_env(),
    }
}

fn print_order(book: &OrderBook, id: OrderId) {
    let scale = book.config().price_scale;
    match book.resting_order(id) {
        Some(o) => println!(
            "ID: {} | {:<4} | Qty: {} | Price: {}",
            o.id(),
            o.side(),
            o.quantity(),
            ticks_to_decimal(o.price(), scale)
        ),
        None => println!("ID: {} | not resting", id),
    }
}

fn walkthrough(book: &mut OrderBook) -> Result<(), BookError> {
    println!("--- Resting liquidity ---");
    book.submit(OrderId(1), 10050, 10, Side::Buy)?;
    book.submit(OrderId(2), 10040, 20, Side::Buy)?;
    print_order(book, OrderId(1));
    print_order(book, OrderId(2));

    println!("\n--- Incoming sell 5 @ 100.50 (partial fill) ---");
    book.submit(OrderId(3), 10050, 5, Side::Sell)?;
    print_order(book, OrderId(1));

    println!("\n--- Incoming sell 15 @ 100.30 (walks the book) ---");
    book.submit(OrderId(4), 10030, 15, Side::Sell)?;
    print_order(book, OrderId(1));
    print_order(book, OrderId(2));

    println!("\n--- Cancel order 2 ---");
    book.cancel_order(OrderId(2));
    print_order(book, OrderId(2));
    println!("Resting orders: {}", book.order_count());
    Ok(())
}

fn main() {
    let _ = env_logger::try_init();
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    info!(
        "starting order_capacity={} max_levels_per_side={}",
        config.order_capacity, config.max_levels_per_side
    );

    let mut book = match OrderBook::new(config.clone()) {
        Ok(book) => book,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = walkthrough(&mut book) {
        eprintln!("walkthrough failed: {}", e);
        std::process::exit(1);
    }

    let seed = std::env::var("SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let commands = Generator::new(GeneratorConfig {
        seed,
        num_commands: 10_000,
        ..Default::default()
    })
    .all_commands();
    let mut replay_book = OrderBook::new(config).expect("config already validated");
    let start = std::time::Instant::now();
    match replay_into_book(&mut replay_book, commands) {
        Ok(stats) => {
            let elapsed = start.elapsed();
            println!("\n--- Replay (seed {}) in {:?} ---", seed, elapsed);
            println!("{}", serde_json::to_string_pretty(&stats).expect("serialize stats"));
            println!(
                "{}",
                serde_json::to_string_pretty(&replay_book.snapshot(5)).expect("serialize snapshot")
            );
        }
        Err(e) => {
            eprintln!("replay failed: {}", e);
            std::process::exit(1);
        }
    }
}
