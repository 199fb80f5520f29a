//! Utils

use clap::Parser;

/// Arguments for the basket example
#[derive(Debug, Parser)]
pub struct CheckoutArgs {
    /// Fixture set to load prices and rules from
    #[clap(short, long, default_value = "standard")]
    pub fixture: String,

    /// Render the receipt as a table
    #[clap(short, long)]
    pub table: bool,

    /// Product codes to scan, in order
    #[clap(required = true)]
    pub codes: Vec<String>,
}
