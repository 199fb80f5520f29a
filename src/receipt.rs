//! Receipt

use std::io;

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

use crate::{discounts::list_subtotal, pricing::format_amount};

/// The priced result for every scan of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResult {
    code: String,
    count: usize,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl LineResult {
    /// Create a line for `count` units of `code`.
    pub fn new(
        code: impl Into<String>,
        count: usize,
        unit_price: Decimal,
        subtotal: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            count,
            unit_price,
            subtotal,
        }
    }

    /// Product code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Number of units scanned
    pub fn count(&self) -> usize {
        self.count
    }

    /// List price of one unit
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Amount charged for all units after discounts, unrounded
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Amount the units would cost at list price.
    pub fn list_subtotal(&self) -> Option<Decimal> {
        list_subtotal(self.count, self.unit_price)
    }
}

/// Priced breakdown of a basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// One line per distinct product, in first-scanned order
    lines: SmallVec<[LineResult; 4]>,

    /// Sum of line subtotals, unrounded
    total: Decimal,
}

impl Receipt {
    /// Create a receipt from priced lines and their exact total.
    pub fn new(lines: impl IntoIterator<Item = LineResult>, total: Decimal) -> Self {
        Self {
            lines: lines.into_iter().collect(),
            total,
        }
    }

    /// An empty receipt totalling zero.
    pub fn empty() -> Self {
        Self {
            lines: SmallVec::new(),
            total: Decimal::ZERO,
        }
    }

    /// Priced lines
    pub fn lines(&self) -> &[LineResult] {
        &self.lines
    }

    /// Total amount payable
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Total amount at list prices, or `None` on overflow.
    pub fn list_total(&self) -> Option<Decimal> {
        self.lines.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.list_subtotal()?)
        })
    }

    /// Amount saved by discounts, or `None` on overflow.
    pub fn savings(&self) -> Option<Decimal> {
        self.list_total()?.checked_sub(self.total)
    }

    /// Write one line per product and the rounded total.
    ///
    /// ```text
    /// GR1: 2   Subtotal for GR1: 3.11
    /// Total: 3.11
    /// ```
    ///
    /// # Errors
    ///
    /// Returns any error raised by `out`.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        for line in &self.lines {
            writeln!(
                out,
                "{code}: {count}   Subtotal for {code}: {subtotal}",
                code = line.code,
                count = line.count,
                subtotal = format_amount(line.subtotal),
            )?;
        }

        writeln!(out, "Total: {}", format_amount(self.total))
    }

    /// Write the receipt as a table with list prices and savings.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `out`.
    pub fn write_table_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut builder = Builder::default();

        builder.push_record(["Product", "Qty", "Unit Price", "Subtotal"]);

        for line in &self.lines {
            builder.push_record([
                line.code.clone(),
                line.count.to_string(),
                format_amount(line.unit_price),
                format_amount(line.subtotal),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Alignment::center());
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}")?;

        if let Some(savings) = self.savings() {
            writeln!(out, "Savings: {}", format_amount(savings))?;
        }

        writeln!(out, "Total: {}", format_amount(self.total))
    }
}
