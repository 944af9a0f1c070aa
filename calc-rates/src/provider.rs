use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use calc_core::calculations::{CurrencyCode, ExchangeError, RateTable};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::snapshot::{RateSnapshot, RateSource};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate service returned status {0}")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    #[error("Rate service quoted {actual}, expected {expected}")]
    BaseMismatch {
        expected: CurrencyCode,
        actual: String,
    },

    #[error("Invalid rates: {0}")]
    InvalidRates(#[from] ExchangeError),
}

/// Source of live exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch the latest rates quoted against `base`.
    async fn fetch_latest(
        &self,
        base: &CurrencyCode,
    ) -> Result<RateSnapshot, RateFetchError>;
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: String,
    #[serde(default)]
    date: Option<String>,
    rates: BTreeMap<String, serde_json::Number>,
}

/// [`RateProvider`] backed by an HTTP API serving `GET {base_url}/latest/{BASE}`.
///
/// The response body is expected to look like
/// `{ "base": "USD", "date": "2024-05-01", "rates": { "KRW": 1370.5, ... } }`.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRateProvider {
    /// # Errors
    ///
    /// Returns [`RateFetchError::Http`] if the HTTP client fails to build.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RateFetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_latest(
        &self,
        base: &CurrencyCode,
    ) -> Result<RateSnapshot, RateFetchError> {
        let url = format!("{}/latest/{}", self.base_url, base);
        debug!(%url, "Fetching exchange rates");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RateFetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let parsed: LatestRatesResponse =
            serde_json::from_str(&body).map_err(|e| RateFetchError::InvalidBody(e.to_string()))?;

        let table = into_rate_table(base, parsed.base, parsed.rates)?;
        let quoted_on = parsed
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

        debug!(%base, currencies = table.rates().len(), "Fetched exchange rates");

        Ok(RateSnapshot {
            table,
            source: RateSource::Live {
                fetched_at: Utc::now(),
                quoted_on,
            },
        })
    }
}

fn into_rate_table(
    expected: &CurrencyCode,
    base: String,
    raw: BTreeMap<String, serde_json::Number>,
) -> Result<RateTable, RateFetchError> {
    if !base.eq_ignore_ascii_case(expected.as_str()) {
        return Err(RateFetchError::BaseMismatch {
            expected: expected.clone(),
            actual: base,
        });
    }

    let mut rates = Vec::with_capacity(raw.len());
    for (code, number) in raw {
        // Providers list metals and crypto with non-ISO codes; skip them.
        let Ok(code) = CurrencyCode::parse(&code) else {
            debug!(%code, "Skipping unrecognized currency code");
            continue;
        };
        let rate = Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .map_err(|e| RateFetchError::InvalidBody(format!("rate for {code}: {e}")))?;
        rates.push((code, rate));
    }

    Ok(RateTable::new(expected.clone(), rates)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn usd() -> CurrencyCode {
        CurrencyCode::parse("USD").unwrap()
    }

    fn numbers(json: &str) -> BTreeMap<String, serde_json::Number> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn into_rate_table_keeps_exact_decimals() {
        let table =
            into_rate_table(&usd(), "USD".to_string(), numbers(r#"{"EUR": 0.92, "KRW": 1370.55}"#))
                .unwrap();

        assert_eq!(table.rate(&CurrencyCode::parse("EUR").unwrap()).unwrap(), dec!(0.92));
        assert_eq!(table.rate(&CurrencyCode::parse("KRW").unwrap()).unwrap(), dec!(1370.55));
    }

    #[test]
    fn into_rate_table_skips_non_iso_codes() {
        let table =
            into_rate_table(&usd(), "USD".to_string(), numbers(r#"{"EUR": 0.92, "BTC2": 1}"#))
                .unwrap();

        // USD is added as the base.
        assert_eq!(table.rates().len(), 2);
    }

    #[test]
    fn into_rate_table_rejects_base_mismatch() {
        let err = into_rate_table(&usd(), "EUR".to_string(), numbers(r#"{"USD": 1.09}"#))
            .unwrap_err();

        assert!(matches!(err, RateFetchError::BaseMismatch { .. }));
    }

    #[test]
    fn into_rate_table_rejects_zero_rate() {
        let err = into_rate_table(&usd(), "USD".to_string(), numbers(r#"{"EUR": 0}"#))
            .unwrap_err();

        assert!(matches!(
            err,
            RateFetchError::InvalidRates(ExchangeError::NonPositiveRate { .. })
        ));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let provider = HttpRateProvider::new("http://localhost:1234/", DEFAULT_TIMEOUT).unwrap();

        assert_eq!(provider.base_url(), "http://localhost:1234");
    }
}
