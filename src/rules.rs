//! Rules
//!
//! A [`RuleSet`] holds at most one [`DiscountRule`] per product together with
//! the price list used to value them. Rules are validated once, up front, and
//! the set is never mutated afterwards.

use std::num::NonZeroUsize;

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use serde_norway::{Mapping, Number, Value};
use thiserror::Error;
use tracing::debug;

use crate::{
    discounts::{Discount, DiscountKind, DiscountRule, list_subtotal},
    pricing::PricingError,
    products::{Catalogue, PriceList, ProductCode},
};

/// Errors raised while validating pricing rules.
///
/// Validation stops at the first violation; no partial rule set is built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleSetError {
    /// The rules container is not a map.
    #[error("Pricing rules must be a map.")]
    InvalidRuleSetShape,

    /// A product key is empty or not a string.
    #[error("Product keys must be non-empty strings. Invalid key: {0}")]
    InvalidProductCode(String),

    /// A rule is not a record with `kind`, `threshold` and `value`.
    #[error(
        "Each rule must be a map with kind, threshold and value. Invalid rule for {code}: {rule}"
    )]
    InvalidRuleShape {
        /// Product the rule belongs to
        code: String,
        /// The offending rule, as written
        rule: String,
    },

    /// The discount kind is not recognised.
    #[error("Invalid kind: {kind}. Must be one of: {allowed}", allowed = DiscountKind::allowed())]
    UnknownDiscountKind {
        /// Product the rule belongs to
        code: String,
        /// The offending kind, as written
        kind: String,
    },

    /// The threshold is not a positive integer.
    #[error("Threshold must be a positive integer. Invalid threshold: {threshold}")]
    InvalidThreshold {
        /// Product the rule belongs to
        code: String,
        /// The offending threshold, as written
        threshold: String,
    },

    /// The value is not a non-negative number.
    #[error("Value must be a non-negative number. Invalid value: {value}")]
    InvalidDiscountValue {
        /// Product the rule belongs to
        code: String,
        /// The offending value, as written
        value: String,
    },

    /// The value is a non-negative number too large for a decimal amount.
    #[error("Value exceeds the largest supported amount. Invalid value: {value}")]
    ValueOutOfRange {
        /// Product the rule belongs to
        code: String,
        /// The offending value, as written
        value: String,
    },
}

/// An unvalidated rule as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRule {
    /// Discount kind name, e.g. `FixedBulkPrice`
    pub kind: String,

    /// Minimum quantity before the discount applies
    pub threshold: i64,

    /// Kind-specific amount: bulk unit price or retained fraction
    pub value: Decimal,
}

impl RawRule {
    /// Create a raw rule.
    pub fn new(kind: impl Into<String>, threshold: i64, value: Decimal) -> Self {
        Self {
            kind: kind.into(),
            threshold,
            value,
        }
    }

    /// Check the rule for `code`: kind, then threshold, then value.
    fn validate(&self, code: &str) -> Result<DiscountRule, RuleSetError> {
        let kind = self.kind.parse::<DiscountKind>().map_err(|unknown| {
            RuleSetError::UnknownDiscountKind {
                code: code.to_string(),
                kind: unknown.0,
            }
        })?;

        let threshold = usize::try_from(self.threshold)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| RuleSetError::InvalidThreshold {
                code: code.to_string(),
                threshold: self.threshold.to_string(),
            })?;

        if self.value < Decimal::ZERO {
            return Err(RuleSetError::InvalidDiscountValue {
                code: code.to_string(),
                value: self.value.to_string(),
            });
        }

        let discount = match kind {
            DiscountKind::BuyXGetOneFree => Discount::BuyXGetOneFree,
            DiscountKind::FixedBulkPrice => Discount::FixedBulkPrice(self.value),
            DiscountKind::PercentageOff => Discount::PercentageOff(self.value),
        };

        Ok(DiscountRule::new(threshold, discount))
    }
}

/// Validated discount rules and the price list they are applied against.
#[derive(Debug, Clone)]
pub struct RuleSet<P: PriceList = Catalogue> {
    rules: FxHashMap<ProductCode, DiscountRule>,
    prices: P,
}

impl RuleSet<Catalogue> {
    /// Validate `rules` against the standard catalogue.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] found, in iteration order.
    pub fn new<I, K>(rules: I) -> Result<Self, RuleSetError>
    where
        I: IntoIterator<Item = (K, RawRule)>,
        K: Into<String>,
    {
        Self::with_price_list(rules, Catalogue::standard())
    }

    /// Validate untyped rules (for example parsed YAML) against the standard catalogue.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] found, in document order.
    pub fn from_value(rules: &Value) -> Result<Self, RuleSetError> {
        Self::from_value_with_price_list(rules, Catalogue::standard())
    }
}

impl<P: PriceList> RuleSet<P> {
    /// Validate `rules` and pair them with `prices`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] found, in iteration order.
    pub fn with_price_list<I, K>(rules: I, prices: P) -> Result<Self, RuleSetError>
    where
        I: IntoIterator<Item = (K, RawRule)>,
        K: Into<String>,
    {
        let mut validated = FxHashMap::default();

        for (code, raw) in rules {
            let code = product_code(code.into())?;
            let rule = raw.validate(code.as_str())?;

            validated.insert(code, rule);
        }

        Ok(Self::from_validated(validated, prices))
    }

    /// Validate untyped rules and pair them with `prices`.
    ///
    /// The container must be a map of product code to a record with `kind`,
    /// `threshold` and `value` fields. `type` is accepted in place of `kind`.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] found, in document order.
    pub fn from_value_with_price_list(rules: &Value, prices: P) -> Result<Self, RuleSetError> {
        let Value::Mapping(entries) = rules else {
            return Err(RuleSetError::InvalidRuleSetShape);
        };

        let mut validated = FxHashMap::default();

        for (key, rule) in entries {
            let code = match key {
                Value::String(code) => product_code(code.clone())?,
                other => return Err(RuleSetError::InvalidProductCode(describe(other))),
            };

            let rule = raw_rule(code.as_str(), rule)?.validate(code.as_str())?;

            validated.insert(code, rule);
        }

        Ok(Self::from_validated(validated, prices))
    }

    fn from_validated(rules: FxHashMap<ProductCode, DiscountRule>, prices: P) -> Self {
        debug!(rules = rules.len(), "validated pricing rules");

        Self { rules, prices }
    }

    /// Unit price of `code` from the price list.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ProductNotFound`] if the product is not priced.
    pub fn price_for(&self, code: &str) -> Result<Decimal, PricingError> {
        self.prices
            .price_for(code)
            .ok_or_else(|| PricingError::ProductNotFound(code.to_string()))
    }

    /// Price `count` units of `code`, applying its discount rule if one is active.
    ///
    /// # Errors
    ///
    /// - [`PricingError::ProductNotFound`]: the product is not priced.
    /// - [`PricingError::Overflow`]: the subtotal cannot be represented.
    pub fn apply_discount(&self, code: &str, count: usize) -> Result<Decimal, PricingError> {
        let price = self.price_for(code)?;

        let subtotal = match self.rules.get(code) {
            Some(rule) => rule.subtotal(count, price),
            None => list_subtotal(count, price),
        };

        subtotal.ok_or_else(|| PricingError::Overflow(code.to_string()))
    }

    /// The rule for `code`, if any.
    pub fn rule_for(&self, code: &str) -> Option<&DiscountRule> {
        self.rules.get(code)
    }

    /// The price list backing this rule set.
    pub fn price_list(&self) -> &P {
        &self.prices
    }

    /// Number of products with a rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no product has a rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn product_code(code: String) -> Result<ProductCode, RuleSetError> {
    ProductCode::new(code).ok_or_else(|| RuleSetError::InvalidProductCode("\"\"".to_string()))
}

/// Check the structure of an untyped rule, in the same order as [`RawRule::validate`].
fn raw_rule(code: &str, rule: &Value) -> Result<RawRule, RuleSetError> {
    let invalid_shape = || RuleSetError::InvalidRuleShape {
        code: code.to_string(),
        rule: describe(rule),
    };

    let Value::Mapping(fields) = rule else {
        return Err(invalid_shape());
    };

    let (Some(kind), Some(threshold), Some(value)) = (
        field(fields, "kind").or_else(|| field(fields, "type")),
        field(fields, "threshold"),
        field(fields, "value"),
    ) else {
        return Err(invalid_shape());
    };

    let kind = match kind {
        Value::String(kind) => kind.parse::<DiscountKind>().map(|_| kind.clone()).ok(),
        _ => None,
    }
    .ok_or_else(|| RuleSetError::UnknownDiscountKind {
        code: code.to_string(),
        kind: describe(kind),
    })?;

    let threshold = match threshold {
        Value::Number(n) => n.as_i64().filter(|threshold| *threshold > 0),
        _ => None,
    }
    .ok_or_else(|| RuleSetError::InvalidThreshold {
        code: code.to_string(),
        threshold: describe(threshold),
    })?;

    let value = match value {
        Value::Number(n) => match decimal_from_number(n) {
            Some(amount) => Ok(amount),
            None if n.as_f64().is_some_and(|f| f.is_finite() && f >= 0.0) => {
                Err(RuleSetError::ValueOutOfRange {
                    code: code.to_string(),
                    value: describe(value),
                })
            }
            None => Err(invalid_value(code, value)),
        },
        _ => Err(invalid_value(code, value)),
    }?;

    Ok(RawRule {
        kind,
        threshold,
        value,
    })
}

fn invalid_value(code: &str, value: &Value) -> RuleSetError {
    RuleSetError::InvalidDiscountValue {
        code: code.to_string(),
        value: describe(value),
    }
}

fn field<'a>(fields: &'a Mapping, name: &str) -> Option<&'a Value> {
    fields.get(name)
}

/// Convert a YAML number to a decimal, preferring its written form.
///
/// Returns `None` for non-finite numbers and for magnitudes beyond
/// [`Decimal::MAX`].
pub(crate) fn decimal_from_number(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }

    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }

    n.to_string()
        .parse::<Decimal>()
        .ok()
        .or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

/// Render a configuration value for an error message.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        other => format!("{other:?}"),
    }
}
