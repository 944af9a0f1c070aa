//! Live exchange rates with a static fallback.
//!
//! ```text
//! ExchangeRateService::latest(base)
//!     ├── RateProvider::fetch_latest(base)  ── Ok  ──► RateSnapshot { Live }
//!     └── any error (logged at warn)        ──────► RateSnapshot { Fallback }
//!
//! ExchangeRateService::quote(from, to)
//!     └── live rates missing `from` or `to` (logged at warn) ──► Fallback
//! ```

mod provider;
mod service;
mod snapshot;

pub use provider::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpRateProvider, RateFetchError, RateProvider};
pub use service::ExchangeRateService;
pub use snapshot::{RateSnapshot, RateSource};
