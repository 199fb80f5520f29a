//! Fixtures
//!
//! YAML configuration for price lists and pricing rules.
//!
//! ```yaml
//! # fixtures/prices/standard.yml
//! prices:
//!   GR1: 3.11
//!
//! # fixtures/rules/standard.yml
//! rules:
//!   GR1: { kind: BuyXGetOneFree, threshold: 2, value: 0 }
//! ```

use std::{collections::BTreeMap, fs, path::PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_norway::{Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
    products::{Catalogue, ProductCode},
    rules::{RuleSet, RuleSetError, decimal_from_number},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price for a product
    #[error("Invalid price for {0}: {1}")]
    InvalidPrice(String, String),

    /// Rules failed validation
    #[error(transparent)]
    Rules(#[from] RuleSetError),

    /// No rules loaded
    #[error("No rules loaded; cannot build a rule set")]
    NoRules,
}

#[derive(Debug, Deserialize)]
struct PricesFixture {
    prices: BTreeMap<String, Number>,
}

#[derive(Debug, Deserialize)]
struct RulesFixture {
    rules: Value,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded prices, or `None` to use the standard catalogue
    prices: Option<Catalogue>,

    /// Loaded rules, validated when the rule set is built
    rules: Option<Value>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            prices: None,
            rules: None,
        }
    }

    /// Load prices and rules of the same name from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_prices(name)?.load_rules(name)?;

        Ok(fixture)
    }

    /// Load a price list from `prices/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a price is
    /// negative or not a decimal.
    pub fn load_prices(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("prices", name)?;
        let fixture: PricesFixture = serde_norway::from_str(&contents)?;

        let mut catalogue = Catalogue::new();

        for (code, price) in fixture.prices {
            let invalid = || FixtureError::InvalidPrice(code.clone(), price.to_string());

            let amount = decimal_from_number(&price)
                .filter(|amount| *amount >= Decimal::ZERO)
                .ok_or_else(invalid)?;
            let product = ProductCode::new(code.clone()).ok_or_else(invalid)?;

            catalogue.insert(product, amount);
        }

        debug!(name, products = catalogue.len(), "loaded prices");

        self.prices = Some(catalogue);

        Ok(self)
    }

    /// Load pricing rules from `rules/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = self.read("rules", name)?;
        let fixture: RulesFixture = serde_norway::from_str(&contents)?;

        debug!(name, "loaded rules");

        self.rules = Some(fixture.rules);

        Ok(self)
    }

    /// Loaded price list, falling back to the standard catalogue
    pub fn catalogue(&self) -> Catalogue {
        self.prices.clone().unwrap_or_else(Catalogue::standard)
    }

    /// Validate the loaded rules against the loaded price list
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoRules`] if no rules were loaded, or
    /// [`FixtureError::Rules`] if they fail validation.
    pub fn rule_set(&self) -> Result<RuleSet, FixtureError> {
        let rules = self.rules.as_ref().ok_or(FixtureError::NoRules)?;

        Ok(RuleSet::from_value_with_price_list(rules, self.catalogue())?)
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;
    use crate::discounts::Discount;

    fn write_fixture(dir: &TempDir, kind: &str, name: &str, contents: &str) -> TestResult {
        let kind_dir = dir.path().join(kind);

        fs::create_dir_all(&kind_dir)?;
        fs::write(kind_dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn standard_set_loads() -> TestResult {
        let fixture = Fixture::from_set("standard")?;
        let rules = fixture.rule_set()?;

        assert_eq!(rules.len(), 3);
        assert_eq!(rules.price_for("CF1")?, Decimal::new(1123, 2));
        assert_eq!(
            rules.rule_for("SR1").map(|rule| *rule.discount()),
            Some(Discount::FixedBulkPrice(Decimal::new(450, 2)))
        );

        Ok(())
    }

    #[test]
    fn custom_prices_are_used() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(&dir, "prices", "shop", "prices:\n  TEA: 2.50\n  MUG: 8\n")?;
        write_fixture(
            &dir,
            "rules",
            "shop",
            "rules:\n  TEA: { kind: BuyXGetOneFree, threshold: 3, value: 0 }\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_prices("shop")?.load_rules("shop")?;

        let rules = fixture.rule_set()?;

        assert_eq!(rules.price_for("MUG")?, Decimal::new(8, 0));
        assert_eq!(rules.apply_discount("TEA", 3)?, Decimal::new(500, 2));
        assert!(rules.price_for("GR1").is_err());

        Ok(())
    }

    #[test]
    fn rules_without_prices_use_standard_catalogue() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(&dir, "rules", "empty", "rules: {}\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_rules("empty")?;

        let rules = fixture.rule_set()?;

        assert!(rules.is_empty());
        assert_eq!(rules.price_for("GR1")?, Decimal::new(311, 2));

        Ok(())
    }

    #[test]
    fn negative_price_is_rejected() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(&dir, "prices", "bad", "prices:\n  TEA: -1.00\n")?;

        let result = Fixture::with_base_path(dir.path())
            .load_prices("bad")
            .map(|_| ());

        assert!(matches!(result, Err(FixtureError::InvalidPrice(code, _)) if code == "TEA"));

        Ok(())
    }

    #[test]
    fn invalid_rules_surface_validation_error() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(&dir, "rules", "bad", "rules:\n  - GR1\n")?;

        let mut fixture = Fixture::with_base_path(dir.path());
        fixture.load_rules("bad")?;

        assert!(matches!(
            fixture.rule_set(),
            Err(FixtureError::Rules(RuleSetError::InvalidRuleSetShape))
        ));

        Ok(())
    }

    #[test]
    fn missing_rules_and_files_are_errors() {
        let fixture = Fixture::with_base_path("./does-not-exist");

        assert!(matches!(fixture.rule_set(), Err(FixtureError::NoRules)));
        assert!(matches!(
            Fixture::with_base_path("./does-not-exist").load_rules("standard"),
            Err(FixtureError::Io(_))
        ));
    }
}
