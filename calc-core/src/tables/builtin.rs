//! Static bracket tables.
//!
//! | regime       | year | tiers (lower bound / rate / deduction) |
//! |--------------|------|-----------------------------------------|
//! | `freelancer` | 2024 | 0 / 3% / 0 … 500M / 42% / 35.4M          |
//! | `income`     | 2024 | 0 / 6% / 0 … 1B / 45% / 65.94M           |
//!
//! The freelancer table's deductions are the published figures and do not
//! all reproduce the marginal sum; see
//! [`deduction_drift`](crate::calculations::validation::deduction_drift).

use rust_decimal::Decimal;

use crate::models::{Bracket, BracketTable, TaxRegime};

const MILLION: i64 = 1_000_000;

fn won(millions: i64) -> Decimal {
    Decimal::from(millions * MILLION)
}

/// Builds brackets from `(lower, rate_percent, deduction)` rows; each upper
/// bound is the next row's lower bound and the last row is unbounded.
fn brackets_from_rows(rows: &[(Decimal, u32, Decimal)]) -> Vec<Bracket> {
    rows.iter()
        .enumerate()
        .map(|(i, &(lower_bound, rate_percent, cumulative_deduction))| Bracket {
            lower_bound,
            upper_bound: rows.get(i + 1).map(|&(next_lower, _, _)| next_lower),
            rate: Decimal::new(i64::from(rate_percent), 2),
            cumulative_deduction,
        })
        .collect()
}

/// 2024 freelancer withholding settlement table.
pub fn freelancer_withholding_2024() -> BracketTable {
    let rows = [
        (won(0), 3, Decimal::ZERO),
        (won(12), 15, Decimal::from(1_440_000)),
        (won(46), 24, Decimal::from(5_120_000)),
        (won(88), 35, Decimal::from(14_960_000)),
        (won(150), 38, Decimal::from(19_400_000)),
        (won(300), 40, Decimal::from(25_400_000)),
        (won(500), 42, Decimal::from(35_400_000)),
    ];

    BracketTable::new_unchecked(
        TaxRegime::FreelancerWithholding,
        2024,
        brackets_from_rows(&rows),
    )
}

/// 2024 comprehensive income tax table.
pub fn comprehensive_income_2024() -> BracketTable {
    let rows = [
        (won(0), 6, Decimal::ZERO),
        (won(14), 15, Decimal::from(1_260_000)),
        (won(50), 24, Decimal::from(5_760_000)),
        (won(88), 35, Decimal::from(15_440_000)),
        (won(150), 38, Decimal::from(19_940_000)),
        (won(300), 40, Decimal::from(25_940_000)),
        (won(500), 42, Decimal::from(35_940_000)),
        (won(1000), 45, Decimal::from(65_940_000)),
    ];

    BracketTable::new_unchecked(
        TaxRegime::ComprehensiveIncome,
        2024,
        brackets_from_rows(&rows),
    )
}

/// Every built-in table.
pub fn all() -> Vec<BracketTable> {
    vec![freelancer_withholding_2024(), comprehensive_income_2024()]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::validation::{deduction_drift, validate_brackets};

    #[test]
    fn every_builtin_table_satisfies_invariants() {
        for table in all() {
            assert_eq!(
                validate_brackets(table.brackets()),
                Ok(()),
                "{} {} is malformed",
                table.regime(),
                table.year()
            );
        }
    }

    #[test]
    fn freelancer_2024_matches_published_figures() {
        let table = freelancer_withholding_2024();
        let b = table.brackets();

        assert_eq!(b.len(), 7);
        assert_eq!(b[0].upper_bound, Some(dec!(12000000)));
        assert_eq!(b[0].rate, dec!(0.03));
        assert_eq!(b[2].lower_bound, dec!(46000000));
        assert_eq!(b[2].cumulative_deduction, dec!(5120000));
        assert_eq!(b[6].lower_bound, dec!(500000000));
        assert_eq!(b[6].rate, dec!(0.42));
        assert_eq!(b[6].cumulative_deduction, dec!(35400000));
        assert_eq!(b[6].upper_bound, None);
    }

    #[test]
    fn freelancer_2024_deductions_are_monotonic() {
        let table = freelancer_withholding_2024();

        for pair in table.brackets().windows(2) {
            assert!(pair[1].cumulative_deduction >= pair[0].cumulative_deduction);
            assert_eq!(pair[0].upper_bound, Some(pair[1].lower_bound));
        }
    }

    #[test]
    fn freelancer_2024_published_deductions_drift_from_marginal_sum() {
        let table = freelancer_withholding_2024();

        let drift = deduction_drift(&table);

        // Only the 15% tier reproduces the marginal sum exactly.
        assert!(drift.iter().all(|d| d.index >= 2));
        assert_eq!(drift.len(), 5);
    }

    #[test]
    fn income_2024_deductions_match_marginal_sum() {
        let table = comprehensive_income_2024();

        assert!(deduction_drift(&table).is_empty());
    }

    #[test]
    fn income_2024_matches_from_marginal_rates() {
        let derived = BracketTable::from_marginal_rates(
            TaxRegime::ComprehensiveIncome,
            2024,
            &[
                (dec!(0), dec!(0.06)),
                (dec!(14000000), dec!(0.15)),
                (dec!(50000000), dec!(0.24)),
                (dec!(88000000), dec!(0.35)),
                (dec!(150000000), dec!(0.38)),
                (dec!(300000000), dec!(0.40)),
                (dec!(500000000), dec!(0.42)),
                (dec!(1000000000), dec!(0.45)),
            ],
        )
        .unwrap();

        assert_eq!(derived, comprehensive_income_2024());
    }
}
