//! Progressive-bracket tax resolution.
//!
//! The resolver uses the flat-rate-minus-deduction shortcut: the whole
//! taxable amount is multiplied by the marginal rate of the tier it falls
//! into and the tier's cumulative deduction is subtracted. For a table whose
//! deductions were derived with
//! [`derive_cumulative_deductions`](crate::calculations::validation::derive_cumulative_deductions)
//! this equals summing each lower tier at its own rate plus the excess in the
//! current tier.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::ProgressiveTaxResolver;
//! use calc_core::tables::builtin::freelancer_withholding_2024;
//!
//! let table = freelancer_withholding_2024();
//! let resolver = ProgressiveTaxResolver::new(&table);
//!
//! let result = resolver.resolve(dec!(50000000));
//!
//! assert_eq!(result.applied_rate, dec!(0.24));
//! assert_eq!(result.tax, dec!(6880000));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::round_to_unit;
use crate::models::{BracketTable, CalculationResult};

/// Resolves taxable amounts against one [`BracketTable`].
#[derive(Debug, Clone, Copy)]
pub struct ProgressiveTaxResolver<'a> {
    table: &'a BracketTable,
}

impl<'a> ProgressiveTaxResolver<'a> {
    pub fn new(table: &'a BracketTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a BracketTable {
        self.table
    }

    /// Returns the marginal rate and the total tax for `taxable_amount`.
    ///
    /// A negative amount is clamped to zero rather than rejected. The tax is
    /// rounded once, half-up, to a whole currency unit.
    pub fn resolve(
        &self,
        taxable_amount: Decimal,
    ) -> CalculationResult {
        let amount = if taxable_amount < Decimal::ZERO {
            debug!(%taxable_amount, "negative taxable amount clamped to zero");
            Decimal::ZERO
        } else {
            taxable_amount
        };

        let bracket = self.table.bracket_for(amount);
        let tax = round_to_unit(amount * bracket.rate - bracket.cumulative_deduction);

        debug!(
            regime = %self.table.regime(),
            year = self.table.year(),
            %amount,
            rate = %bracket.rate,
            %tax,
            "resolved progressive tax"
        );

        CalculationResult {
            applied_rate: bracket.rate,
            tax,
        }
    }
}

/// Resolves `taxable_amount` against `table`.
///
/// Shorthand for `ProgressiveTaxResolver::new(table).resolve(taxable_amount)`.
pub fn resolve(
    taxable_amount: Decimal,
    table: &BracketTable,
) -> CalculationResult {
    ProgressiveTaxResolver::new(table).resolve(taxable_amount)
}
