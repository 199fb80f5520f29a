//! Basket

use std::io;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    pricing::PricingError,
    products::{Catalogue, PriceList},
    receipt::{LineResult, Receipt},
    rules::RuleSet,
};

/// Errors that can occur when checking out a basket.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A product could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The receipt could not be written.
    #[error("Failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// Scanned product codes, priced against a shared [`RuleSet`].
///
/// Codes are not checked when scanned; unknown products surface when the
/// basket is totalled. A basket has a single owner and is not meant to be
/// scanned into from several threads.
#[derive(Debug)]
pub struct Basket<'a, P: PriceList = Catalogue> {
    rules: &'a RuleSet<P>,
    scans: Vec<String>,
}

impl<'a, P: PriceList> Basket<'a, P> {
    /// Create an empty basket priced by `rules`.
    pub fn new(rules: &'a RuleSet<P>) -> Self {
        Self {
            rules,
            scans: Vec::new(),
        }
    }

    /// Add a product to the basket.
    pub fn scan(&mut self, code: impl Into<String>) -> &mut Self {
        self.scans.push(code.into());
        self
    }

    /// Get the number of scans in the basket.
    pub fn len(&self) -> usize {
        self.scans.len()
    }

    /// Check if the basket is empty.
    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    /// Scanned codes, in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scans.iter().map(String::as_str)
    }

    /// The rule set pricing this basket.
    pub fn rules(&self) -> &'a RuleSet<P> {
        self.rules
    }

    /// Calculate the total price of the basket after discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any scanned product cannot be priced. No
    /// partial total is returned.
    #[tracing::instrument(level = "debug", skip(self), fields(scans = self.scans.len()))]
    pub fn total(&self) -> Result<Decimal, PricingError> {
        if self.is_empty() {
            return Ok(Decimal::ZERO);
        }

        Ok(self.receipt()?.total())
    }

    /// Price every distinct product in the basket.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if any scanned product cannot be priced.
    pub fn receipt(&self) -> Result<Receipt, PricingError> {
        if self.is_empty() {
            return Ok(Receipt::empty());
        }

        let mut total = Decimal::ZERO;
        let mut lines: SmallVec<[LineResult; 4]> = SmallVec::new();

        for (code, count) in self.counts() {
            let line = self.price_line(code, count)?;

            total = total
                .checked_add(line.subtotal())
                .ok_or_else(|| PricingError::Overflow(code.to_string()))?;

            lines.push(line);
        }

        debug!(%total, products = lines.len(), "priced basket");

        Ok(Receipt::new(lines, total))
    }

    /// Write the receipt for this basket to `out` and return the total.
    ///
    /// An empty basket writes nothing and totals zero.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if pricing fails or `out` cannot be written.
    pub fn checkout(&self, out: impl io::Write) -> Result<Decimal, CheckoutError> {
        if self.is_empty() {
            return Ok(Decimal::ZERO);
        }

        let receipt = self.receipt()?;

        receipt.write_to(out)?;

        Ok(receipt.total())
    }

    fn price_line(&self, code: &str, count: usize) -> Result<LineResult, PricingError> {
        let priced = self.rules.price_for(code).and_then(|unit_price| {
            let subtotal = self.rules.apply_discount(code, count)?;
            Ok((unit_price, subtotal))
        });

        let (unit_price, subtotal) = priced.inspect_err(|err| {
            warn!(code, count, %err, "could not price product");
        })?;

        debug!(code, count, %subtotal, "priced product");

        Ok(LineResult::new(code, count, unit_price, subtotal))
    }

    /// Count scans per product, in first-scanned order.
    fn counts(&self) -> SmallVec<[(&str, usize); 4]> {
        let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
        let mut counts: SmallVec<[(&str, usize); 4]> = SmallVec::new();

        for code in self.iter() {
            if let Some(&position) = positions.get(code) {
                if let Some((_, count)) = counts.get_mut(position) {
                    *count += 1;
                }
            } else {
                positions.insert(code, counts.len());
                counts.push((code, 1));
            }
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::rules::RawRule;

    fn test_rules() -> Result<RuleSet, crate::rules::RuleSetError> {
        RuleSet::new([
            ("GR1", RawRule::new("BuyXGetOneFree", 2, Decimal::ZERO)),
            ("SR1", RawRule::new("FixedBulkPrice", 3, Decimal::new(450, 2))),
            ("CF1", RawRule::new("PercentageOff", 3, Decimal::TWO / Decimal::from(3))),
        ])
    }

    #[test]
    fn scan_chains_and_preserves_order() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);

        basket.scan("GR1").scan("SR1").scan("GR1");

        assert_eq!(basket.len(), 3);
        assert_eq!(basket.iter().collect::<Vec<_>>(), ["GR1", "SR1", "GR1"]);
        assert!(
            std::ptr::eq(basket.rules(), &rules),
            "basket prices against the rule set it was created with"
        );

        Ok(())
    }

    #[test]
    fn empty_basket_totals_zero() -> TestResult {
        let rules = test_rules()?;
        let basket = Basket::new(&rules);

        assert!(basket.is_empty());
        assert_eq!(basket.total()?, Decimal::ZERO);
        assert_eq!(basket.receipt()?, Receipt::empty());

        Ok(())
    }

    #[test]
    fn counts_group_in_first_scanned_order() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);

        basket.scan("SR1").scan("GR1").scan("SR1").scan("CF1").scan("GR1");

        assert_eq!(
            basket.counts().as_slice(),
            &[("SR1", 2), ("GR1", 2), ("CF1", 1)]
        );

        Ok(())
    }

    #[test]
    fn total_of_mixed_basket() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);

        for code in ["GR1", "GR1", "SR1", "SR1", "SR1", "CF1", "CF1", "CF1"] {
            basket.scan(code);
        }

        assert_eq!(basket.total()?.round_dp(2), Decimal::new(3907, 2));

        Ok(())
    }

    #[test]
    fn total_is_repeatable() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);

        basket.scan("CF1").scan("CF1").scan("CF1").scan("GR1");

        assert_eq!(basket.total()?, basket.total()?);

        Ok(())
    }

    #[test]
    fn unknown_product_fails_at_total_not_scan() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);

        basket.scan("GR1").scan("XXX");

        assert_eq!(basket.len(), 2);
        assert_eq!(
            basket.total(),
            Err(PricingError::ProductNotFound("XXX".to_string()))
        );

        Ok(())
    }

    #[test]
    fn receipt_lines_carry_counts_and_subtotals() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);

        basket.scan("SR1").scan("SR1").scan("SR1").scan("GR1");

        let receipt = basket.receipt()?;
        let lines = receipt.lines();

        assert_eq!(
            lines.first(),
            Some(&LineResult::new(
                "SR1",
                3,
                Decimal::new(500, 2),
                Decimal::new(1350, 2)
            ))
        );
        assert_eq!(
            lines.get(1),
            Some(&LineResult::new(
                "GR1",
                1,
                Decimal::new(311, 2),
                Decimal::new(311, 2)
            ))
        );
        assert_eq!(receipt.total(), Decimal::new(1661, 2));

        Ok(())
    }

    #[test]
    fn checkout_writes_breakdown_and_total() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);
        let mut out = Vec::new();

        basket.scan("GR1").scan("GR1").scan("SR1");

        let total = basket.checkout(&mut out)?;

        assert_eq!(total, Decimal::new(811, 2));
        assert_eq!(
            String::from_utf8(out)?,
            "GR1: 2   Subtotal for GR1: 3.11\nSR1: 1   Subtotal for SR1: 5.00\nTotal: 8.11\n"
        );

        Ok(())
    }

    #[test]
    fn checkout_of_empty_basket_writes_nothing() -> TestResult {
        let rules = test_rules()?;
        let basket = Basket::new(&rules);
        let mut out = Vec::new();

        assert_eq!(basket.checkout(&mut out)?, Decimal::ZERO);
        assert!(out.is_empty());

        Ok(())
    }

    #[test]
    fn checkout_with_unknown_product_writes_nothing() -> TestResult {
        let rules = test_rules()?;
        let mut basket = Basket::new(&rules);
        let mut out = Vec::new();

        basket.scan("GR1").scan("XXX");

        assert!(matches!(
            basket.checkout(&mut out),
            Err(CheckoutError::Pricing(PricingError::ProductNotFound(_)))
        ));
        assert!(out.is_empty());

        Ok(())
    }
}
