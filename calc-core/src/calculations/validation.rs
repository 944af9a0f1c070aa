//! Bracket-table invariant checks and deduction derivation.
//!
//! A table is valid when its brackets start at zero, are contiguous and
//! ascending, end in a single unbounded tier, carry rates in `[0, 1]` and
//! have non-negative, non-decreasing cumulative deductions starting at zero.
//!
//! Whether the stored deductions actually reproduce the tier-by-tier marginal
//! sum is a separate question answered by [`deduction_drift`]; published
//! tables do not always satisfy it and it is reported rather than rejected.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::is_fraction;
use crate::models::{Bracket, BracketTable, BracketTableError};

/// Checks every bracket-table invariant and returns the first violation.
///
/// # Errors
///
/// Returns the [`BracketTableError`] describing the first violated invariant,
/// scanning brackets in order.
pub fn validate_brackets(brackets: &[Bracket]) -> Result<(), BracketTableError> {
    let first = brackets.first().ok_or(BracketTableError::Empty)?;

    if first.lower_bound != Decimal::ZERO {
        return Err(BracketTableError::NonZeroStart(first.lower_bound));
    }
    if first.cumulative_deduction != Decimal::ZERO {
        return Err(BracketTableError::NonZeroInitialDeduction(
            first.cumulative_deduction,
        ));
    }

    let last_index = brackets.len() - 1;

    for (index, bracket) in brackets.iter().enumerate() {
        if !is_fraction(bracket.rate) {
            return Err(BracketTableError::InvalidRate {
                index,
                rate: bracket.rate,
            });
        }

        if bracket.cumulative_deduction < Decimal::ZERO {
            return Err(BracketTableError::NegativeDeduction {
                index,
                deduction: bracket.cumulative_deduction,
            });
        }

        match bracket.upper_bound {
            Some(upper) if upper <= bracket.lower_bound => {
                return Err(BracketTableError::EmptyRange {
                    index,
                    lower: bracket.lower_bound,
                    upper,
                });
            }
            None if index != last_index => {
                return Err(BracketTableError::UnboundedBeforeEnd { index });
            }
            _ => {}
        }

        if index > 0 {
            let previous = &brackets[index - 1];

            // The previous bracket is bounded: an unbounded one would have
            // been rejected on the previous iteration.
            if let Some(previous_upper) = previous.upper_bound {
                if previous_upper != bracket.lower_bound {
                    return Err(BracketTableError::NotContiguous {
                        index,
                        previous_upper,
                        lower: bracket.lower_bound,
                    });
                }
            }

            if bracket.cumulative_deduction < previous.cumulative_deduction {
                return Err(BracketTableError::DecreasingDeduction {
                    index,
                    previous: previous.cumulative_deduction,
                    deduction: bracket.cumulative_deduction,
                });
            }
        }
    }

    if !brackets[last_index].is_unbounded() {
        return Err(BracketTableError::BoundedTop);
    }

    Ok(())
}

/// Derives the cumulative deduction of each `(lower_bound, rate)` tier.
///
/// `d[0] = 0` and `d[i] = d[i-1] + lower[i] * (rate[i] - rate[i-1])`, which
/// makes `amount * rate[i] - d[i]` equal to the marginal tax summed over all
/// lower tiers plus the excess in tier `i`.
pub fn derive_cumulative_deductions(tiers: &[(Decimal, Decimal)]) -> Vec<Decimal> {
    let mut deductions = Vec::with_capacity(tiers.len());
    let mut previous: Option<(Decimal, Decimal)> = None;

    for &(lower_bound, rate) in tiers {
        let deduction = match previous {
            None => Decimal::ZERO,
            Some((previous_rate, previous_deduction)) => {
                previous_deduction + lower_bound * (rate - previous_rate)
            }
        };
        deductions.push(deduction);
        previous = Some((rate, deduction));
    }

    deductions
}

/// A tier whose stored deduction differs from the derived marginal-sum value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionDrift {
    pub index: usize,
    pub lower_bound: Decimal,
    pub expected: Decimal,
    pub actual: Decimal,
}

impl DeductionDrift {
    /// How much more tax this tier charges than the marginal-rate sum would,
    /// at every amount inside the tier.
    ///
    /// The step in tax at the tier's lower bound is this value minus the
    /// previous tier's excess (zero when the previous tier has no drift).
    pub fn excess(&self) -> Decimal {
        self.expected - self.actual
    }
}

/// Lists every tier of `table` whose cumulative deduction does not match
/// [`derive_cumulative_deductions`].
///
/// An empty result means the tax function of the table is continuous and
/// non-decreasing over the whole domain.
pub fn deduction_drift(table: &BracketTable) -> Vec<DeductionDrift> {
    let brackets = table.brackets();
    let tiers: Vec<(Decimal, Decimal)> = brackets
        .iter()
        .map(|b| (b.lower_bound, b.rate))
        .collect();

    derive_cumulative_deductions(&tiers)
        .into_iter()
        .zip(brackets)
        .enumerate()
        .filter(|(_, (expected, bracket))| *expected != bracket.cumulative_deduction)
        .map(|(index, (expected, bracket))| DeductionDrift {
            index,
            lower_bound: bracket.lower_bound,
            expected,
            actual: bracket.cumulative_deduction,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxRegime;

    fn bracket(
        lower: Decimal,
        upper: Option<Decimal>,
        rate: Decimal,
        deduction: Decimal,
    ) -> Bracket {
        Bracket {
            lower_bound: lower,
            upper_bound: upper,
            rate,
            cumulative_deduction: deduction,
        }
    }

    fn valid_brackets() -> Vec<Bracket> {
        vec![
            bracket(dec!(0), Some(dec!(1000)), dec!(0.10), dec!(0)),
            bracket(dec!(1000), Some(dec!(5000)), dec!(0.20), dec!(100)),
            bracket(dec!(5000), None, dec!(0.30), dec!(600)),
        ]
    }

    // =========================================================================
    // validate_brackets tests
    // =========================================================================

    #[test]
    fn validate_accepts_valid_brackets() {
        assert_eq!(validate_brackets(&valid_brackets()), Ok(()));
    }

    #[test]
    fn validate_accepts_single_unbounded_bracket() {
        let brackets = vec![bracket(dec!(0), None, dec!(0.033), dec!(0))];

        assert_eq!(validate_brackets(&brackets), Ok(()));
    }

    #[test]
    fn validate_rejects_empty() {
        assert_eq!(validate_brackets(&[]), Err(BracketTableError::Empty));
    }

    #[test]
    fn validate_rejects_non_zero_start() {
        let mut brackets = valid_brackets();
        brackets[0].lower_bound = dec!(1);

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::NonZeroStart(dec!(1)))
        );
    }

    #[test]
    fn validate_rejects_non_zero_initial_deduction() {
        let mut brackets = valid_brackets();
        brackets[0].cumulative_deduction = dec!(10);

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::NonZeroInitialDeduction(dec!(10)))
        );
    }

    #[test]
    fn validate_rejects_gap() {
        let mut brackets = valid_brackets();
        brackets[1].upper_bound = Some(dec!(4000));

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::NotContiguous {
                index: 2,
                previous_upper: dec!(4000),
                lower: dec!(5000),
            })
        );
    }

    #[test]
    fn validate_rejects_unsorted_brackets() {
        let brackets = vec![
            bracket(dec!(0), Some(dec!(5000)), dec!(0.10), dec!(0)),
            bracket(dec!(5000), Some(dec!(1000)), dec!(0.20), dec!(500)),
            bracket(dec!(1000), None, dec!(0.30), dec!(600)),
        ];

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::EmptyRange {
                index: 1,
                lower: dec!(5000),
                upper: dec!(1000),
            })
        );
    }

    #[test]
    fn validate_rejects_bounded_top() {
        let mut brackets = valid_brackets();
        brackets[2].upper_bound = Some(dec!(10000));

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::BoundedTop)
        );
    }

    #[test]
    fn validate_rejects_unbounded_middle_bracket() {
        let mut brackets = valid_brackets();
        brackets[1].upper_bound = None;

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::UnboundedBeforeEnd { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut brackets = valid_brackets();
        brackets[2].rate = dec!(30);

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::InvalidRate {
                index: 2,
                rate: dec!(30),
            })
        );
    }

    #[test]
    fn validate_rejects_decreasing_deduction() {
        let mut brackets = valid_brackets();
        brackets[2].cumulative_deduction = dec!(50);

        assert_eq!(
            validate_brackets(&brackets),
            Err(BracketTableError::DecreasingDeduction {
                index: 2,
                previous: dec!(100),
                deduction: dec!(50),
            })
        );
    }

    // =========================================================================
    // derive_cumulative_deductions tests
    // =========================================================================

    #[test]
    fn derive_returns_empty_for_no_tiers() {
        assert!(derive_cumulative_deductions(&[]).is_empty());
    }

    #[test]
    fn derive_matches_published_2024_income_tax_deductions() {
        let tiers = [
            (dec!(0), dec!(0.06)),
            (dec!(14000000), dec!(0.15)),
            (dec!(50000000), dec!(0.24)),
            (dec!(88000000), dec!(0.35)),
            (dec!(150000000), dec!(0.38)),
            (dec!(300000000), dec!(0.40)),
            (dec!(500000000), dec!(0.42)),
            (dec!(1000000000), dec!(0.45)),
        ];

        let deductions = derive_cumulative_deductions(&tiers);

        assert_eq!(
            deductions,
            vec![
                dec!(0),
                dec!(1260000),
                dec!(5760000),
                dec!(15440000),
                dec!(19940000),
                dec!(25940000),
                dec!(35940000),
                dec!(65940000),
            ]
        );
    }

    // =========================================================================
    // deduction_drift tests
    // =========================================================================

    #[test]
    fn drift_is_empty_for_derived_table() {
        let table =
            BracketTable::new(TaxRegime::ComprehensiveIncome, 2024, valid_brackets()).unwrap();

        assert!(deduction_drift(&table).is_empty());
    }

    #[test]
    fn drift_reports_mismatched_tier() {
        let mut brackets = valid_brackets();
        brackets[2].cumulative_deduction = dec!(700);
        let table = BracketTable::new(TaxRegime::ComprehensiveIncome, 2024, brackets).unwrap();

        let drift = deduction_drift(&table);

        assert_eq!(
            drift,
            vec![DeductionDrift {
                index: 2,
                lower_bound: dec!(5000),
                expected: dec!(600),
                actual: dec!(700),
            }]
        );
        assert_eq!(drift[0].excess(), dec!(-100));
    }
}
