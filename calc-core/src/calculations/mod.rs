//! Calculator arithmetic.
//!
//! The progressive tax resolver and the bracket validation it relies on sit
//! at the center; the remaining calculators are independent of one another
//! and share only the rounding helpers in [`common`].

pub mod common;
pub mod compound;
pub mod exchange;
pub mod freelancer;
pub mod loan;
pub mod progressive;
pub mod subnet;
pub mod validation;
pub mod vat;

pub use compound::{
    CompoundInterestError, CompoundInterestInput, CompoundInterestResult, CompoundingFrequency,
    YearProjection,
};
pub use exchange::{CurrencyCode, ExchangeError, RateTable, fallback_rates};
pub use freelancer::{
    FreelancerConfig, FreelancerError, FreelancerInput, FreelancerResult, FreelancerWorksheet,
};
pub use loan::{Installment, LoanError, LoanInput, LoanResult, RepaymentMethod};
pub use progressive::{ProgressiveTaxResolver, resolve};
pub use subnet::{AddressClass, SubnetError, SubnetInfo};
pub use validation::{DeductionDrift, deduction_drift, derive_cumulative_deductions};
pub use vat::{VatBreakdown, VatError, default_vat_rate};
