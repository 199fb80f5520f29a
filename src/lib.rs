//! Checkout
//!
//! A point-of-sale pricing engine: scan product codes into a [`Basket`](basket::Basket)
//! and total them against per-product discount rules held in a
//! [`RuleSet`](rules::RuleSet).

pub mod basket;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod rules;
pub mod utils;
