//! Compound interest with a year-by-year projection.
//!
//! Interest is compounded `n` times a year at `annual_rate / n`. An optional
//! contribution is deposited at the end of every compounding period, after
//! that period's interest has been credited. Full precision is carried
//! through the loop; only the reported figures are rounded to cents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;

pub const MAX_YEARS: u32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompoundInterestError {
    #[error("principal must be non-negative, got {0}")]
    NegativePrincipal(Decimal),

    #[error("annual rate must be non-negative, got {0}")]
    NegativeRate(Decimal),

    #[error("periodic contribution must be non-negative, got {0}")]
    NegativeContribution(Decimal),

    #[error("years must be between 1 and {MAX_YEARS}, got {0}")]
    InvalidYears(u32),

    #[error("balance overflowed in year {0}")]
    Overflow(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompoundingFrequency {
    #[default]
    Annually,
    Quarterly,
    Monthly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Annually => 1,
            Self::Quarterly => 4,
            Self::Monthly => 12,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annually" | "yearly" | "annual" => Some(Self::Annually),
            "quarterly" => Some(Self::Quarterly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: Decimal,
    /// Nominal annual rate as a fraction (0.05 for 5%).
    pub annual_rate: Decimal,
    pub years: u32,
    pub frequency: CompoundingFrequency,
    /// Deposited at the end of each compounding period.
    pub periodic_contribution: Decimal,
}

/// Balance at the end of one projected year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    /// Principal plus every contribution made so far.
    pub total_contributions: Decimal,
    /// Interest earned since the start, cumulative.
    pub interest_earned: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub final_balance: Decimal,
    pub total_contributions: Decimal,
    pub total_interest: Decimal,
    pub projection: Vec<YearProjection>,
}

/// Projects `input` year by year.
///
/// # Errors
///
/// Returns [`CompoundInterestError`] for negative amounts, a year count
/// outside `1..=MAX_YEARS`, or a balance too large to represent.
pub fn project(input: &CompoundInterestInput) -> Result<CompoundInterestResult, CompoundInterestError> {
    validate(input)?;

    let periods = input.frequency.periods_per_year();
    let rate_per_period = input.annual_rate / Decimal::from(periods);

    let mut balance = input.principal;
    let mut contributed = input.principal;
    let mut projection = Vec::with_capacity(input.years as usize);

    for year in 1..=input.years {
        for _ in 0..periods {
            balance = balance
                .checked_mul(rate_per_period)
                .and_then(|interest| balance.checked_add(interest))
                .and_then(|b| b.checked_add(input.periodic_contribution))
                .ok_or(CompoundInterestError::Overflow(year))?;
            contributed += input.periodic_contribution;
        }

        projection.push(YearProjection {
            year,
            total_contributions: round_half_up(contributed),
            interest_earned: round_half_up(balance - contributed),
            balance: round_half_up(balance),
        });
    }

    Ok(CompoundInterestResult {
        final_balance: round_half_up(balance),
        total_contributions: round_half_up(contributed),
        total_interest: round_half_up(balance - contributed),
        projection,
    })
}

fn validate(input: &CompoundInterestInput) -> Result<(), CompoundInterestError> {
    if input.principal < Decimal::ZERO {
        return Err(CompoundInterestError::NegativePrincipal(input.principal));
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(CompoundInterestError::NegativeRate(input.annual_rate));
    }
    if input.periodic_contribution < Decimal::ZERO {
        return Err(CompoundInterestError::NegativeContribution(
            input.periodic_contribution,
        ));
    }
    if input.years == 0 || input.years > MAX_YEARS {
        return Err(CompoundInterestError::InvalidYears(input.years));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn annual_input() -> CompoundInterestInput {
        CompoundInterestInput {
            principal: dec!(1000000),
            annual_rate: dec!(0.05),
            years: 3,
            frequency: CompoundingFrequency::Annually,
            periodic_contribution: dec!(0),
        }
    }

    #[test]
    fn annual_compounding_projects_each_year() {
        let result = project(&annual_input()).unwrap();

        let balances: Vec<_> = result.projection.iter().map(|p| p.balance).collect();
        assert_eq!(
            balances,
            vec![dec!(1050000.00), dec!(1102500.00), dec!(1157625.00)]
        );
        assert_eq!(result.final_balance, dec!(1157625.00));
        assert_eq!(result.total_contributions, dec!(1000000.00));
        assert_eq!(result.total_interest, dec!(157625.00));
    }

    #[test]
    fn quarterly_compounding_rounds_only_reported_figures() {
        let input = CompoundInterestInput {
            principal: dec!(10000),
            annual_rate: dec!(0.08),
            years: 1,
            frequency: CompoundingFrequency::Quarterly,
            periodic_contribution: dec!(0),
        };

        let result = project(&input).unwrap();

        // 10000 * 1.02^4 = 10824.3216
        assert_eq!(result.final_balance, dec!(10824.32));
        assert_eq!(result.total_interest, dec!(824.32));
    }

    #[test]
    fn monthly_contributions_accumulate_as_annuity() {
        let input = CompoundInterestInput {
            principal: dec!(0),
            annual_rate: dec!(0.12),
            years: 1,
            frequency: CompoundingFrequency::Monthly,
            periodic_contribution: dec!(100),
        };

        let result = project(&input).unwrap();

        // 100 * ((1.01^12 - 1) / 0.01) = 1268.25
        assert_eq!(result.final_balance, dec!(1268.25));
        assert_eq!(result.total_contributions, dec!(1200.00));
        assert_eq!(result.total_interest, dec!(68.25));
    }

    #[test]
    fn zero_rate_only_accumulates_contributions() {
        let input = CompoundInterestInput {
            principal: dec!(500),
            annual_rate: dec!(0),
            years: 2,
            frequency: CompoundingFrequency::Monthly,
            periodic_contribution: dec!(10),
        };

        let result = project(&input).unwrap();

        assert_eq!(result.final_balance, dec!(740.00));
        assert_eq!(result.total_interest, dec!(0.00));
        assert_eq!(result.projection[0].balance, dec!(620.00));
    }

    #[test]
    fn projection_has_one_row_per_year() {
        let mut input = annual_input();
        input.years = 30;

        let result = project(&input).unwrap();

        assert_eq!(result.projection.len(), 30);
        assert_eq!(result.projection[29].year, 30);
    }

    #[test]
    fn rejects_zero_years() {
        let mut input = annual_input();
        input.years = 0;

        assert_eq!(project(&input), Err(CompoundInterestError::InvalidYears(0)));
    }

    #[test]
    fn rejects_negative_rate() {
        let mut input = annual_input();
        input.annual_rate = dec!(-0.01);

        assert_eq!(
            project(&input),
            Err(CompoundInterestError::NegativeRate(dec!(-0.01)))
        );
    }

    #[test]
    fn reports_overflow_instead_of_panicking() {
        let input = CompoundInterestInput {
            principal: dec!(1000000000),
            annual_rate: dec!(100),
            years: 100,
            frequency: CompoundingFrequency::Monthly,
            periodic_contribution: dec!(0),
        };

        assert!(matches!(
            project(&input),
            Err(CompoundInterestError::Overflow(_))
        ));
    }

    #[test]
    fn frequency_parse_accepts_aliases() {
        assert_eq!(
            CompoundingFrequency::parse("Yearly"),
            Some(CompoundingFrequency::Annually)
        );
        assert_eq!(
            CompoundingFrequency::parse("monthly"),
            Some(CompoundingFrequency::Monthly)
        );
        assert_eq!(CompoundingFrequency::parse("daily"), None);
    }
}
