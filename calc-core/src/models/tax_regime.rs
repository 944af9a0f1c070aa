use serde::{Deserialize, Serialize};

/// A family of bracket tables that share one purpose, one table per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxRegime {
    /// Year-end settlement table used by the freelancer withholding calculator.
    FreelancerWithholding,
    /// National comprehensive income tax.
    ComprehensiveIncome,
}

impl TaxRegime {
    pub fn all() -> &'static [TaxRegime] {
        &[TaxRegime::FreelancerWithholding, TaxRegime::ComprehensiveIncome]
    }

    /// Short code used in CSV files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FreelancerWithholding => "freelancer",
            Self::ComprehensiveIncome => "income",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FreelancerWithholding => "Freelancer withholding",
            Self::ComprehensiveIncome => "Comprehensive income tax",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "freelancer" => Some(Self::FreelancerWithholding),
            "income" => Some(Self::ComprehensiveIncome),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaxRegime {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
