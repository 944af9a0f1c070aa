use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One marginal-rate tier of a [`BracketTable`](crate::BracketTable).
///
/// The tier covers `[lower_bound, upper_bound)`. An `upper_bound` of `None`
/// marks the top tier, which is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub cumulative_deduction: Decimal,
}

impl Bracket {
    /// Returns true if `amount` falls inside this tier.
    ///
    /// The lower edge is inclusive and the upper edge exclusive, so an amount
    /// sitting exactly on a boundary belongs to the tier above it.
    pub fn contains(
        &self,
        amount: Decimal,
    ) -> bool {
        amount >= self.lower_bound && self.upper_bound.is_none_or(|upper| amount < upper)
    }

    pub fn is_unbounded(&self) -> bool {
        self.upper_bound.is_none()
    }
}
