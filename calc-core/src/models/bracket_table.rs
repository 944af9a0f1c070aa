use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::calculations::validation::{derive_cumulative_deductions, validate_brackets};
use crate::models::{Bracket, TaxRegime};

/// A violated bracket-table invariant.
///
/// `index` always refers to the position of the offending bracket in the
/// sequence handed to the constructor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("bracket table is empty")]
    Empty,

    #[error("first bracket must start at 0, starts at {0}")]
    NonZeroStart(Decimal),

    #[error("first bracket must have a cumulative deduction of 0, has {0}")]
    NonZeroInitialDeduction(Decimal),

    #[error("bracket {index} is empty or inverted: [{lower}, {upper})")]
    EmptyRange {
        index: usize,
        lower: Decimal,
        upper: Decimal,
    },

    #[error("bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd { index: usize },

    #[error("last bracket must be unbounded")]
    BoundedTop,

    #[error("gap or overlap before bracket {index}: previous ends at {previous_upper}, this starts at {lower}")]
    NotContiguous {
        index: usize,
        previous_upper: Decimal,
        lower: Decimal,
    },

    #[error("bracket {index} rate {rate} is outside [0, 1]")]
    InvalidRate { index: usize, rate: Decimal },

    #[error("bracket {index} has a negative cumulative deduction {deduction}")]
    NegativeDeduction { index: usize, deduction: Decimal },

    #[error("bracket {index} deduction {deduction} is below the previous tier's {previous}")]
    DecreasingDeduction {
        index: usize,
        previous: Decimal,
        deduction: Decimal,
    },
}

/// An ordered, contiguous, validated set of brackets for one regime and year.
///
/// A `BracketTable` can only be built through [`BracketTable::new`] or
/// [`BracketTable::from_marginal_rates`], both of which check every
/// invariant, so the resolver can rely on exactly one bracket matching any
/// non-negative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    regime: TaxRegime,
    year: i32,
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Builds a table from fully specified brackets.
    ///
    /// # Errors
    ///
    /// Returns the first [`BracketTableError`] found by
    /// [`validate_brackets`].
    pub fn new(
        regime: TaxRegime,
        year: i32,
        brackets: Vec<Bracket>,
    ) -> Result<Self, BracketTableError> {
        validate_brackets(&brackets)?;
        Ok(Self {
            regime,
            year,
            brackets,
        })
    }

    /// Builds a table from `(lower_bound, rate)` tiers, deriving the upper
    /// bounds and the cumulative deductions.
    ///
    /// The derived deductions make `amount * rate - deduction` equal to the
    /// tier-by-tier marginal sum.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use calc_core::{BracketTable, TaxRegime};
    ///
    /// let table = BracketTable::from_marginal_rates(
    ///     TaxRegime::ComprehensiveIncome,
    ///     2024,
    ///     &[(dec!(0), dec!(0.06)), (dec!(14000000), dec!(0.15))],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.brackets()[1].cumulative_deduction, dec!(1260000));
    /// assert_eq!(table.brackets()[0].upper_bound, Some(dec!(14000000)));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`BracketTableError`] if the tiers are empty, unsorted or
    /// otherwise violate the table invariants.
    pub fn from_marginal_rates(
        regime: TaxRegime,
        year: i32,
        tiers: &[(Decimal, Decimal)],
    ) -> Result<Self, BracketTableError> {
        let deductions = derive_cumulative_deductions(tiers);
        let brackets = tiers
            .iter()
            .zip(deductions)
            .enumerate()
            .map(|(i, (&(lower_bound, rate), cumulative_deduction))| Bracket {
                lower_bound,
                upper_bound: tiers.get(i + 1).map(|&(next_lower, _)| next_lower),
                rate,
                cumulative_deduction,
            })
            .collect();

        Self::new(regime, year, brackets)
    }

    /// Builds a table without running the invariant checks.
    ///
    /// Reserved for the static tables in [`crate::tables::builtin`], whose
    /// validity is pinned by that module's tests.
    pub(crate) fn new_unchecked(
        regime: TaxRegime,
        year: i32,
        brackets: Vec<Bracket>,
    ) -> Self {
        Self {
            regime,
            year,
            brackets,
        }
    }

    pub fn regime(&self) -> TaxRegime {
        self.regime
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Returns the bracket whose range contains `amount`.
    ///
    /// Amounts below zero resolve to the first bracket.
    pub fn bracket_for(
        &self,
        amount: Decimal,
    ) -> &Bracket {
        // Number of brackets starting at or below `amount`; at least one
        // because the first bracket starts at zero.
        let idx = self
            .brackets
            .partition_point(|b| b.lower_bound <= amount)
            .saturating_sub(1);
        &self.brackets[idx]
    }
}
