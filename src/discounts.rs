//! Discounts

use std::{fmt, num::NonZeroUsize, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

/// The recognised discount kinds, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountKind {
    /// Every `threshold`-th unit is free.
    BuyXGetOneFree,

    /// Replace the unit price with a fixed amount.
    FixedBulkPrice,

    /// Multiply the unit price by a retained fraction.
    PercentageOff,
}

impl DiscountKind {
    /// All kinds, in the order they are listed in error messages.
    pub const ALL: [DiscountKind; 3] = [
        DiscountKind::BuyXGetOneFree,
        DiscountKind::FixedBulkPrice,
        DiscountKind::PercentageOff,
    ];

    /// Canonical configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountKind::BuyXGetOneFree => "BuyXGetOneFree",
            DiscountKind::FixedBulkPrice => "FixedBulkPrice",
            DiscountKind::PercentageOff => "PercentageOff",
        }
    }

    /// Comma separated list of the canonical names.
    pub fn allowed() -> String {
        Self::ALL.map(DiscountKind::as_str).join(", ")
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discount kind name that is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid kind: {0}. Must be one of: {allowed}", allowed = DiscountKind::allowed())]
pub struct UnknownDiscountKind(pub String);

impl FromStr for DiscountKind {
    type Err = UnknownDiscountKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BuyXGetOneFree" | "BOGO" => Ok(DiscountKind::BuyXGetOneFree),
            "FixedBulkPrice" | "price" => Ok(DiscountKind::FixedBulkPrice),
            "PercentageOff" | "percentage" => Ok(DiscountKind::PercentageOff),
            other => Err(UnknownDiscountKind(other.to_string())),
        }
    }
}

/// A validated discount, carrying whatever value its kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discount {
    /// For every `threshold` units, one is free.
    BuyXGetOneFree,

    /// Every unit costs this amount instead of its list price.
    FixedBulkPrice(Decimal),

    /// Every unit costs its list price multiplied by this fraction.
    ///
    /// The value is the fraction *paid*, so `0.75` charges 75% of list price.
    PercentageOff(Decimal),
}

impl Discount {
    /// The kind of this discount.
    pub fn kind(&self) -> DiscountKind {
        match self {
            Discount::BuyXGetOneFree => DiscountKind::BuyXGetOneFree,
            Discount::FixedBulkPrice(_) => DiscountKind::FixedBulkPrice,
            Discount::PercentageOff(_) => DiscountKind::PercentageOff,
        }
    }
}

/// A discount that activates once a product's quantity reaches `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountRule {
    threshold: NonZeroUsize,
    discount: Discount,
}

impl DiscountRule {
    /// Create a rule from a validated threshold and discount.
    pub fn new(threshold: NonZeroUsize, discount: Discount) -> Self {
        Self {
            threshold,
            discount,
        }
    }

    /// Minimum quantity for the discount to apply.
    pub fn threshold(&self) -> NonZeroUsize {
        self.threshold
    }

    /// The discount applied at or above the threshold.
    pub fn discount(&self) -> &Discount {
        &self.discount
    }

    /// Whether `count` units qualify for the discount.
    pub fn is_active(&self, count: usize) -> bool {
        count >= self.threshold.get()
    }

    /// Calculates the price of `count` units at `unit_price` under this rule.
    ///
    /// Returns `None` if the result is outside the representable decimal range.
    pub fn subtotal(&self, count: usize, unit_price: Decimal) -> Option<Decimal> {
        if !self.is_active(count) {
            return list_subtotal(count, unit_price);
        }

        let count_dec = Decimal::from(count);

        match self.discount {
            Discount::PercentageOff(retained) => {
                count_dec.checked_mul(unit_price)?.checked_mul(retained)
            }
            Discount::FixedBulkPrice(bulk_price) => count_dec.checked_mul(bulk_price),
            Discount::BuyXGetOneFree => {
                let free = count / self.threshold;
                Decimal::from(count - free).checked_mul(unit_price)
            }
        }
    }
}

/// Price of `count` units with no discount.
pub fn list_subtotal(count: usize, unit_price: Decimal) -> Option<Decimal> {
    Decimal::from(count).checked_mul(unit_price)
}
