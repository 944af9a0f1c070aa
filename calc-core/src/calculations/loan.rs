//! Loan repayment schedules.
//!
//! Three repayment methods are supported:
//!
//! | Method           | Monthly payment |
//! |------------------|-----------------|
//! | `EqualPayment`   | Level installment `P·r·(1+r)^n / ((1+r)^n − 1)` |
//! | `EqualPrincipal` | `P / n` of principal plus interest on the remaining balance |
//! | `Bullet`         | Interest only; principal repaid with the final installment |
//!
//! `r` is the annual rate divided by twelve. Every row is rounded to cents
//! and the final row absorbs the rounding residue so the loan closes at
//! exactly zero.

use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;

pub const MAX_MONTHS: u32 = 600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoanError {
    #[error("principal must be positive, got {0}")]
    NonPositivePrincipal(Decimal),

    #[error("annual rate must be non-negative, got {0}")]
    NegativeRate(Decimal),

    #[error("term must be between 1 and {MAX_MONTHS} months, got {0}")]
    InvalidTerm(u32),

    #[error("installment calculation overflowed")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepaymentMethod {
    #[default]
    EqualPayment,
    EqualPrincipal,
    Bullet,
}

impl RepaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal-payment" | "annuity" => Some(Self::EqualPayment),
            "equal-principal" => Some(Self::EqualPrincipal),
            "bullet" => Some(Self::Bullet),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EqualPayment => "Equal payment",
            Self::EqualPrincipal => "Equal principal",
            Self::Bullet => "Bullet (interest only)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Decimal,
    pub annual_rate: Decimal,
    pub months: u32,
    pub method: RepaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub month: u32,
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
    pub remaining: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResult {
    pub method: RepaymentMethod,
    /// Payment due in the first month.
    pub first_payment: Decimal,
    pub total_payment: Decimal,
    pub total_interest: Decimal,
    pub schedule: Vec<Installment>,
}

/// Builds the full repayment schedule for `input`.
///
/// # Errors
///
/// Returns [`LoanError`] for a non-positive principal, a negative rate, a
/// term outside `1..=MAX_MONTHS`, or an installment too large to represent.
pub fn amortize(input: &LoanInput) -> Result<LoanResult, LoanError> {
    validate(input)?;

    let monthly_rate = input.annual_rate / Decimal::from(12);
    let months = Decimal::from(input.months);

    // Level installment for EqualPayment, level principal for EqualPrincipal.
    let level = match input.method {
        RepaymentMethod::EqualPayment => level_payment(input.principal, monthly_rate, input.months)?,
        RepaymentMethod::EqualPrincipal => round_half_up(input.principal / months),
        RepaymentMethod::Bullet => Decimal::ZERO,
    };

    let mut remaining = input.principal;
    let mut schedule = Vec::with_capacity(input.months as usize);

    for month in 1..=input.months {
        let interest = remaining
            .checked_mul(monthly_rate)
            .map(round_half_up)
            .ok_or(LoanError::Overflow)?;
        let principal = if month == input.months {
            remaining
        } else {
            match input.method {
                RepaymentMethod::EqualPayment => level - interest,
                RepaymentMethod::EqualPrincipal => level.min(remaining),
                RepaymentMethod::Bullet => Decimal::ZERO,
            }
        };
        remaining -= principal;

        schedule.push(Installment {
            month,
            payment: principal.checked_add(interest).ok_or(LoanError::Overflow)?,
            principal,
            interest,
            remaining,
        });
    }

    let total_payment = checked_sum(schedule.iter().map(|i| i.payment))?;
    let total_interest = checked_sum(schedule.iter().map(|i| i.interest))?;
    let first_payment = schedule.first().map_or(Decimal::ZERO, |i| i.payment);

    Ok(LoanResult {
        method: input.method,
        first_payment,
        total_payment,
        total_interest,
        schedule,
    })
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>) -> Result<Decimal, LoanError> {
    values.try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v).ok_or(LoanError::Overflow))
}

/// Level monthly installment, rounded to cents.
fn level_payment(
    principal: Decimal,
    monthly_rate: Decimal,
    months: u32,
) -> Result<Decimal, LoanError> {
    if monthly_rate.is_zero() {
        return Ok(round_half_up(principal / Decimal::from(months)));
    }

    let factor = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(months))
        .ok_or(LoanError::Overflow)?;
    let payment = principal
        .checked_mul(monthly_rate)
        .and_then(|p| p.checked_mul(factor))
        .and_then(|p| p.checked_div(factor - Decimal::ONE))
        .ok_or(LoanError::Overflow)?;

    Ok(round_half_up(payment))
}

fn validate(input: &LoanInput) -> Result<(), LoanError> {
    if input.principal <= Decimal::ZERO {
        return Err(LoanError::NonPositivePrincipal(input.principal));
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(LoanError::NegativeRate(input.annual_rate));
    }
    if input.months == 0 || input.months > MAX_MONTHS {
        return Err(LoanError::InvalidTerm(input.months));
    }
    Ok(())
}
