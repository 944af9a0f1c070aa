use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Output of the progressive tax resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Marginal rate of the tier the taxable amount fell into.
    pub applied_rate: Decimal,
    /// Total tax owed, rounded to a whole currency unit.
    pub tax: Decimal,
}
