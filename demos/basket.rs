//! Basket Example
//!
//! Scans the given product codes into a basket and prints the receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-t` to render the receipt as a table
//!
//! ```text
//! cargo run --example basket -- GR1 SR1 GR1 GR1 CF1
//! ```

use std::io;

use anyhow::Result;
use clap::Parser;
use checkout::{basket::Basket, fixtures::Fixture, utils::CheckoutArgs};
use tracing_subscriber::EnvFilter;

/// Basket Example
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = CheckoutArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let rules = fixture.rule_set()?;

    let mut basket = Basket::new(&rules);

    for code in args.codes {
        basket.scan(code);
    }

    let stdout = io::stdout();
    let handle = stdout.lock();

    if args.table {
        basket.receipt()?.write_table_to(handle)?;
    } else {
        basket.checkout(handle)?;
    }

    Ok(())
}
