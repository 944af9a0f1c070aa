//! Freelancer year-end settlement worksheet.
//!
//! Freelancers have a flat share of every payment withheld during the year
//! (3% national plus 0.3% local income tax). At year end the actual tax is
//! computed on the progressive table and compared with what was withheld.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Gross income |
//! | 2    | Expenses: Line 1 × expense ratio |
//! | 3    | Basic deduction plus additional deductions |
//! | 4    | Taxable income: Line 1 − Line 2 − Line 3 (minimum 0) |
//! | 5    | National income tax (progressive table) |
//! | 6    | Local income tax: Line 5 × local rate |
//! | 7    | Total tax: Line 5 + Line 6 |
//! | 8    | Prepaid withholding (default Line 1 × withholding rate) |
//! | 9    | Settlement: Line 7 − Line 8 (negative is a refund) |
//!
//! The rates and the basic deduction are configuration values, not legal
//! constants.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use calc_core::calculations::{FreelancerConfig, FreelancerInput, FreelancerWorksheet};
//! use calc_core::tables::builtin::freelancer_withholding_2024;
//!
//! let table = freelancer_withholding_2024();
//! let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();
//!
//! let result = worksheet
//!     .calculate(&FreelancerInput {
//!         gross_income: dec!(30000000),
//!         expense_ratio: dec!(0.641),
//!         additional_deductions: dec!(0),
//!         prepaid_withholding: None,
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(9270000));
//! assert_eq!(result.total_tax, dec!(305910));
//! assert_eq!(result.settlement, dec!(-684090));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{is_fraction, non_negative, round_to_unit};
use crate::calculations::progressive::ProgressiveTaxResolver;
use crate::models::BracketTable;

/// Errors that can occur during the freelancer settlement worksheet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FreelancerError {
    #[error("withholding rate must be between 0 and 1, got {0}")]
    InvalidWithholdingRate(Decimal),

    #[error("local tax rate must be between 0 and 1, got {0}")]
    InvalidLocalTaxRate(Decimal),

    #[error("basic deduction must be non-negative, got {0}")]
    NegativeBasicDeduction(Decimal),

    #[error("expense ratio must be between 0 and 1, got {0}")]
    InvalidExpenseRatio(Decimal),

    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
}

/// Configuration for the settlement worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreelancerConfig {
    /// Share of each payment withheld during the year, national and local
    /// combined. Typically 3.3%.
    pub withholding_rate: Decimal,

    /// Local income tax as a share of national income tax. Typically 10%.
    pub local_tax_rate: Decimal,

    /// Personal basic deduction subtracted before the table is applied.
    pub basic_deduction: Decimal,
}

impl Default for FreelancerConfig {
    fn default() -> Self {
        Self {
            withholding_rate: Decimal::new(33, 3),
            local_tax_rate: Decimal::new(10, 2),
            basic_deduction: Decimal::from(1_500_000),
        }
    }
}

impl FreelancerConfig {
    /// # Errors
    ///
    /// Returns [`FreelancerError`] if a rate is outside `[0, 1]` or the basic
    /// deduction is negative.
    pub fn validate(&self) -> Result<(), FreelancerError> {
        if !is_fraction(self.withholding_rate) {
            return Err(FreelancerError::InvalidWithholdingRate(
                self.withholding_rate,
            ));
        }
        if !is_fraction(self.local_tax_rate) {
            return Err(FreelancerError::InvalidLocalTaxRate(self.local_tax_rate));
        }
        if self.basic_deduction < Decimal::ZERO {
            return Err(FreelancerError::NegativeBasicDeduction(
                self.basic_deduction,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreelancerInput {
    pub gross_income: Decimal,

    /// Share of gross income treated as expenses.
    pub expense_ratio: Decimal,

    /// Deductions on top of the configured basic deduction.
    pub additional_deductions: Decimal,

    /// Tax already withheld. When `None`, the configured withholding rate is
    /// applied to gross income.
    pub prepaid_withholding: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreelancerResult {
    pub gross_income: Decimal,
    pub expenses: Decimal,
    pub taxable_income: Decimal,
    pub applied_rate: Decimal,
    pub income_tax: Decimal,
    pub local_income_tax: Decimal,
    pub total_tax: Decimal,
    pub prepaid_withholding: Decimal,

    /// Positive when more tax is owed, negative when a refund is due.
    pub settlement: Decimal,

    /// Gross income minus total tax.
    pub net_income: Decimal,
}

impl FreelancerResult {
    pub fn is_refund(&self) -> bool {
        self.settlement < Decimal::ZERO
    }
}

/// Calculator for the freelancer settlement worksheet.
#[derive(Debug, Clone)]
pub struct FreelancerWorksheet<'a> {
    resolver: ProgressiveTaxResolver<'a>,
    config: FreelancerConfig,
}

impl<'a> FreelancerWorksheet<'a> {
    /// # Errors
    ///
    /// Returns [`FreelancerError`] if `config` fails validation.
    pub fn new(
        table: &'a BracketTable,
        config: FreelancerConfig,
    ) -> Result<Self, FreelancerError> {
        config.validate()?;
        Ok(Self {
            resolver: ProgressiveTaxResolver::new(table),
            config,
        })
    }

    /// Runs every line of the worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`FreelancerError`] if an amount is negative or the expense
    /// ratio is outside `[0, 1]`.
    pub fn calculate(
        &self,
        input: &FreelancerInput,
    ) -> Result<FreelancerResult, FreelancerError> {
        self.validate_input(input)?;

        let expenses = self.expenses(input.gross_income, input.expense_ratio);
        let taxable_income = self.taxable_income(
            input.gross_income,
            expenses,
            input.additional_deductions,
        );

        let resolved = self.resolver.resolve(taxable_income);
        let income_tax = resolved.tax;
        let local_income_tax = self.local_income_tax(income_tax);
        let total_tax = income_tax + local_income_tax;

        let prepaid_withholding = input
            .prepaid_withholding
            .unwrap_or_else(|| self.default_withholding(input.gross_income));
        let settlement = total_tax - prepaid_withholding;

        debug!(%taxable_income, %total_tax, %settlement, "freelancer settlement");

        Ok(FreelancerResult {
            gross_income: input.gross_income,
            expenses,
            taxable_income,
            applied_rate: resolved.applied_rate,
            income_tax,
            local_income_tax,
            total_tax,
            prepaid_withholding,
            settlement,
            net_income: input.gross_income - total_tax,
        })
    }

    fn validate_input(
        &self,
        input: &FreelancerInput,
    ) -> Result<(), FreelancerError> {
        let amounts = [
            ("gross income", Some(input.gross_income)),
            ("additional deductions", Some(input.additional_deductions)),
            ("prepaid withholding", input.prepaid_withholding),
        ];
        for (field, value) in amounts {
            if let Some(value) = value.filter(|v| *v < Decimal::ZERO) {
                return Err(FreelancerError::NegativeAmount { field, value });
            }
        }
        if !is_fraction(input.expense_ratio) {
            return Err(FreelancerError::InvalidExpenseRatio(input.expense_ratio));
        }
        Ok(())
    }

    fn expenses(
        &self,
        gross_income: Decimal,
        expense_ratio: Decimal,
    ) -> Decimal {
        round_to_unit(gross_income * expense_ratio)
    }

    fn taxable_income(
        &self,
        gross_income: Decimal,
        expenses: Decimal,
        additional_deductions: Decimal,
    ) -> Decimal {
        non_negative(gross_income - expenses - self.config.basic_deduction - additional_deductions)
    }

    fn local_income_tax(
        &self,
        income_tax: Decimal,
    ) -> Decimal {
        round_to_unit(income_tax * self.config.local_tax_rate)
    }

    fn default_withholding(
        &self,
        gross_income: Decimal,
    ) -> Decimal {
        round_to_unit(gross_income * self.config.withholding_rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tables::builtin::freelancer_withholding_2024;

    fn test_input() -> FreelancerInput {
        FreelancerInput {
            gross_income: dec!(30000000),
            expense_ratio: dec!(0.641),
            additional_deductions: dec!(0),
            prepaid_withholding: None,
        }
    }

    // =========================================================================
    // config tests
    // =========================================================================

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FreelancerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn config_rejects_withholding_rate_above_one() {
        let config = FreelancerConfig {
            withholding_rate: dec!(3.3),
            ..FreelancerConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(FreelancerError::InvalidWithholdingRate(dec!(3.3)))
        );
    }

    #[test]
    fn config_rejects_negative_basic_deduction() {
        let config = FreelancerConfig {
            basic_deduction: dec!(-1),
            ..FreelancerConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(FreelancerError::NegativeBasicDeduction(dec!(-1)))
        );
    }

    #[test]
    fn new_rejects_invalid_config() {
        let table = freelancer_withholding_2024();
        let config = FreelancerConfig {
            local_tax_rate: dec!(-0.1),
            ..FreelancerConfig::default()
        };

        let result = FreelancerWorksheet::new(&table, config);

        assert_eq!(
            result.err(),
            Some(FreelancerError::InvalidLocalTaxRate(dec!(-0.1)))
        );
    }

    // =========================================================================
    // line tests
    // =========================================================================

    #[test]
    fn taxable_income_never_goes_negative() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();

        let result = worksheet.taxable_income(dec!(1000000), dec!(600000), dec!(0));

        assert_eq!(result, dec!(0));
    }

    #[test]
    fn default_withholding_is_three_point_three_percent() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();

        assert_eq!(worksheet.default_withholding(dec!(30000000)), dec!(990000));
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_refund_case() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();

        let result = worksheet.calculate(&test_input()).unwrap();

        // Expenses: 30,000,000 * 0.641 = 19,230,000
        assert_eq!(result.expenses, dec!(19230000));
        // Taxable: 30,000,000 - 19,230,000 - 1,500,000 = 9,270,000
        assert_eq!(result.taxable_income, dec!(9270000));
        assert_eq!(result.applied_rate, dec!(0.03));
        assert_eq!(result.income_tax, dec!(278100));
        assert_eq!(result.local_income_tax, dec!(27810));
        assert_eq!(result.total_tax, dec!(305910));
        assert_eq!(result.prepaid_withholding, dec!(990000));
        assert_eq!(result.settlement, dec!(-684090));
        assert_eq!(result.net_income, dec!(29694090));
        assert!(result.is_refund());
    }

    #[test]
    fn calculate_additional_payment_case() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();
        let input = FreelancerInput {
            gross_income: dec!(100000000),
            expense_ratio: dec!(0.2),
            additional_deductions: dec!(3000000),
            prepaid_withholding: None,
        };

        let result = worksheet.calculate(&input).unwrap();

        // Taxable: 100M - 20M - 1.5M - 3M = 75.5M, 24% tier
        assert_eq!(result.taxable_income, dec!(75500000));
        // 75,500,000 * 0.24 - 5,120,000 = 13,000,000
        assert_eq!(result.income_tax, dec!(13000000));
        assert_eq!(result.total_tax, dec!(14300000));
        assert_eq!(result.settlement, dec!(11000000));
        assert!(!result.is_refund());
    }

    #[test]
    fn calculate_uses_explicit_prepaid_withholding() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();
        let mut input = test_input();
        input.prepaid_withholding = Some(dec!(305910));

        let result = worksheet.calculate(&input).unwrap();

        assert_eq!(result.settlement, dec!(0));
    }

    #[test]
    fn calculate_rejects_expense_ratio_above_one() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();
        let mut input = test_input();
        input.expense_ratio = dec!(64.1);

        assert_eq!(
            worksheet.calculate(&input),
            Err(FreelancerError::InvalidExpenseRatio(dec!(64.1)))
        );
    }

    #[test]
    fn calculate_rejects_negative_gross_income() {
        let table = freelancer_withholding_2024();
        let worksheet = FreelancerWorksheet::new(&table, FreelancerConfig::default()).unwrap();
        let mut input = test_input();
        input.gross_income = dec!(-1);

        assert_eq!(
            worksheet.calculate(&input),
            Err(FreelancerError::NegativeAmount {
                field: "gross income",
                value: dec!(-1),
            })
        );
    }
}
