//! Ticket Inventory Engine CLI
//!
//! Command-line interface for replaying ticket purchases against a concert catalog.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --concerts concerts.csv purchases.csv > inventory.csv
//! cargo run -- --strategy sync --concerts concerts.csv purchases.csv > inventory.csv
//! cargo run -- --concerts concerts.csv --orders orders.csv purchases.csv > inventory.csv
//! cargo run -- --strategy async --batch-size 200 --max-concurrent 8 --concerts concerts.csv purchases.csv
//! STRIPE_SECRET=sk_test_... cargo run -- --gateway stripe --concerts concerts.csv purchases.csv
//! ```
//!
//! The program loads the concerts, publishes the ones flagged as published,
//! runs every purchase request through the inventory service, and writes the
//! final inventory report to stdout. Diagnostics go to stderr through
//! `tracing`; set `RUST_LOG=info` (or `debug`) for more detail.
//!
//! # Processing Strategies
//!
//! - **sync**: Sequential processing in file order
//! - **async**: Concurrent batches, purchases race for tickets (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use std::fs::File;
use std::process;
use ticket_inventory_engine::billing::build_gateway;
use ticket_inventory_engine::cli::{self, CliArgs};
use ticket_inventory_engine::io::write_orders_csv;
use ticket_inventory_engine::strategy;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

/// Diagnostics go to stderr so stdout stays a clean CSV report
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &CliArgs) -> Result<(), String> {
    // Built outside any runtime, the blocking HTTP client must not be created in async context
    let gateway = build_gateway(&args.to_gateway_config()?)?;

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, gateway)
    };

    let mut output = std::io::stdout();
    let orders = strategy.process(&args.concerts_file, &args.purchases_file, &mut output)?;
    info!(orders = orders.len(), "Replay finished");

    if let Some(path) = &args.orders_file {
        let mut file = File::create(path)
            .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;
        write_orders_csv(&orders, &mut file)?;
    }

    Ok(())
}
