//! Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, CheckoutError},
    discounts::{Discount, DiscountKind, DiscountRule},
    fixtures::{Fixture, FixtureError},
    pricing::PricingError,
    products::{Catalogue, PriceList, ProductCode},
    receipt::{LineResult, Receipt},
    rules::{RawRule, RuleSet, RuleSetError},
};
