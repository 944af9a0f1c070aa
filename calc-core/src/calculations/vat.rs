//! Value-added tax split between supply value and tax.
//!
//! All figures are whole currency units and `supply + vat == total` holds for
//! every breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{is_fraction, round_to_unit};

/// Standard Korean VAT rate (10%).
pub fn default_vat_rate() -> Decimal {
    Decimal::new(10, 2)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VatError {
    #[error("amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("VAT rate must be between 0 and 1, got {0}")]
    InvalidRate(Decimal),

    #[error("total is too large to represent")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatBreakdown {
    pub supply: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub rate: Decimal,
}

impl VatBreakdown {
    /// Adds VAT on top of a supply value.
    ///
    /// # Errors
    ///
    /// Returns [`VatError`] for a negative supply, a rate outside `[0, 1]`, or
    /// a total too large to represent.
    pub fn from_supply(
        supply: Decimal,
        rate: Decimal,
    ) -> Result<Self, VatError> {
        validate(supply, rate)?;
        let vat = round_to_unit(supply * rate);
        let total = supply.checked_add(vat).ok_or(VatError::Overflow)?;
        Ok(Self {
            supply,
            vat,
            total,
            rate,
        })
    }

    /// Splits a VAT-inclusive total into supply value and VAT.
    ///
    /// # Errors
    ///
    /// Returns [`VatError`] for a negative total or a rate outside `[0, 1]`.
    pub fn from_total(
        total: Decimal,
        rate: Decimal,
    ) -> Result<Self, VatError> {
        validate(total, rate)?;
        let supply = round_to_unit(total / (Decimal::ONE + rate));
        Ok(Self {
            supply,
            vat: total - supply,
            total,
            rate,
        })
    }
}

fn validate(
    amount: Decimal,
    rate: Decimal,
) -> Result<(), VatError> {
    if amount < Decimal::ZERO {
        return Err(VatError::NegativeAmount(amount));
    }
    if !is_fraction(rate) {
        return Err(VatError::InvalidRate(rate));
    }
    Ok(())
}
