use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::{
    CompoundInterestResult, CurrencyCode, FreelancerResult, LoanResult, SubnetInfo, VatBreakdown,
};
use crate::models::{CalculationResult, TaxRegime};

/// Result of any calculator, one named shape per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculatorOutput {
    ProgressiveTax {
        regime: TaxRegime,
        year: i32,
        taxable_amount: Decimal,
        result: CalculationResult,
    },
    Freelancer(FreelancerResult),
    CompoundInterest(CompoundInterestResult),
    Loan(LoanResult),
    Vat(VatBreakdown),
    Subnet(SubnetInfo),
    Conversion {
        amount: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
        converted: Decimal,
        /// Where the rate came from, e.g. `last updated: fallback`.
        rate_source: String,
    },
}

impl CalculatorOutput {
    pub fn title(&self) -> &'static str {
        match self {
            Self::ProgressiveTax { .. } => "Progressive tax",
            Self::Freelancer(_) => "Freelancer settlement",
            Self::CompoundInterest(_) => "Compound interest",
            Self::Loan(_) => "Loan repayment",
            Self::Vat(_) => "VAT",
            Self::Subnet(_) => "IPv4 subnet",
            Self::Conversion { .. } => "Currency conversion",
        }
    }
}
