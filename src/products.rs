//! Products

use std::{borrow::Borrow, fmt};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

/// A non-empty product identifier, e.g. `GR1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductCode(String);

impl ProductCode {
    /// Create a product code, returning `None` if `code` is empty.
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();

        if code.is_empty() {
            None
        } else {
            Some(Self(code))
        }
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProductCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProductCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Read-only price lookup.
///
/// Implementations are never mutated by the pricing engine, so a single
/// price list can back any number of rule sets and baskets.
pub trait PriceList {
    /// Unit price for `code`, or `None` if the product is not sold.
    fn price_for(&self, code: &str) -> Option<Decimal>;
}

impl<T: PriceList + ?Sized> PriceList for &T {
    fn price_for(&self, code: &str) -> Option<Decimal> {
        (**self).price_for(code)
    }
}

/// Fixed price list keyed by product code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    prices: FxHashMap<ProductCode, Decimal>,
}

impl Catalogue {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard shop catalogue: green tea, strawberries and coffee.
    pub fn standard() -> Self {
        [
            ("GR1", Decimal::new(311, 2)),
            ("SR1", Decimal::new(500, 2)),
            ("CF1", Decimal::new(1123, 2)),
        ]
        .into_iter()
        .filter_map(|(code, price)| ProductCode::new(code).map(|code| (code, price)))
        .collect()
    }

    /// Add or replace the price of a product.
    pub fn insert(&mut self, code: ProductCode, price: Decimal) -> &mut Self {
        self.prices.insert(code, price);
        self
    }

    /// Number of priced products.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the catalogue has no products.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(ProductCode, Decimal)> for Catalogue {
    fn from_iter<I: IntoIterator<Item = (ProductCode, Decimal)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

impl PriceList for Catalogue {
    fn price_for(&self, code: &str) -> Option<Decimal> {
        self.prices.get(code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_is_rejected() {
        assert_eq!(ProductCode::new(""), None);
        assert_eq!(
            ProductCode::new("GR1").map(|code| code.to_string()),
            Some("GR1".to_string())
        );
    }

    #[test]
    fn standard_catalogue_prices() {
        let catalogue = Catalogue::standard();

        assert_eq!(catalogue.len(), 3);
        assert_eq!(catalogue.price_for("GR1"), Some(Decimal::new(311, 2)));
        assert_eq!(catalogue.price_for("SR1"), Some(Decimal::new(5, 0)));
        assert_eq!(catalogue.price_for("CF1"), Some(Decimal::new(1123, 2)));
        assert_eq!(catalogue.price_for("XXX"), None);
    }

    #[test]
    fn insert_replaces_existing_price() {
        let mut catalogue = Catalogue::new();

        if let Some(code) = ProductCode::new("GR1") {
            catalogue
                .insert(code.clone(), Decimal::ONE)
                .insert(code, Decimal::TWO);
        }

        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.price_for("GR1"), Some(Decimal::TWO));
    }

    #[test]
    fn references_are_price_lists() {
        fn lookup(prices: impl PriceList) -> Option<Decimal> {
            prices.price_for("SR1")
        }

        let catalogue = Catalogue::standard();

        assert_eq!(lookup(&catalogue), Some(Decimal::new(500, 2)));
    }
}
