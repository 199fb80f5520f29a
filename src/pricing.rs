//! Prices

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors that can occur while pricing products.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The product has no entry in the price list.
    #[error("Unknown product: {0}")]
    ProductNotFound(String),

    /// The subtotal for a product could not be represented.
    #[error("Price calculation overflowed for product: {0}")]
    Overflow(String),
}

/// Round an amount to 2 decimal places for display, midpoint away from zero.
///
/// Only applied when presenting amounts; totals are summed unrounded.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount rounded to exactly 2 decimal places.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_for_display(amount))
}
