//! Currency conversion over a table of rates quoted against one base
//! currency.
//!
//! A rate of `r` for currency `X` means one unit of the base currency buys
//! `r` units of `X`. Converting therefore goes through the base:
//! `amount / rate[from] * rate[to]`, rounded half-up to cents at the end.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::round_half_up;

static CURRENCY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern is a valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("'{0}' is not a three-letter ISO 4217 currency code")]
    InvalidCode(String),

    #[error("no rate for currency {0}")]
    UnknownCurrency(CurrencyCode),

    #[error("rate for {code} must be positive, got {rate}")]
    NonPositiveRate { code: CurrencyCode, rate: Decimal },

    #[error("amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("converted amount is too large to represent")]
    Overflow,
}

/// Upper-case three-letter currency code such as `USD` or `KRW`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses a code, accepting lower case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidCode`] unless the input is three ASCII
    /// letters.
    pub fn parse(s: &str) -> Result<Self, ExchangeError> {
        let code = s.trim().to_ascii_uppercase();
        if CURRENCY_CODE.is_match(&code) {
            Ok(Self(code))
        } else {
            Err(ExchangeError::InvalidCode(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ExchangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl RateTable {
    /// Builds a table, inserting the base currency at a rate of one.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::NonPositiveRate`] if any rate is zero or
    /// negative.
    pub fn new(
        base: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
    ) -> Result<Self, ExchangeError> {
        let mut table = BTreeMap::new();
        for (code, rate) in rates {
            if rate <= Decimal::ZERO {
                return Err(ExchangeError::NonPositiveRate { code, rate });
            }
            table.insert(code, rate);
        }
        table.insert(base.clone(), Decimal::ONE);

        Ok(Self { base, rates: table })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn rates(&self) -> &BTreeMap<CurrencyCode, Decimal> {
        &self.rates
    }

    pub fn rate(
        &self,
        code: &CurrencyCode,
    ) -> Result<Decimal, ExchangeError> {
        self.rates
            .get(code)
            .copied()
            .ok_or_else(|| ExchangeError::UnknownCurrency(code.clone()))
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    /// Converts `amount` of `from` into `to`, rounded half-up to cents.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError`] for a negative amount, a currency missing
    /// from the table, or a result too large to represent.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, ExchangeError> {
        if amount < Decimal::ZERO {
            return Err(ExchangeError::NegativeAmount(amount));
        }
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;

        amount
            .checked_div(from_rate)
            .and_then(|base_amount| base_amount.checked_mul(to_rate))
            .map(round_half_up)
            .ok_or(ExchangeError::Overflow)
    }

    /// Re-expresses the table against another base currency.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::UnknownCurrency`] if `base` has no rate, or
    /// [`ExchangeError::Overflow`] if a rebased rate cannot be represented.
    pub fn rebase(
        &self,
        base: &CurrencyCode,
    ) -> Result<Self, ExchangeError> {
        let pivot = self.rate(base)?;
        let rates = self
            .rates
            .iter()
            .map(|(code, rate)| {
                rate.checked_div(pivot)
                    .map(|rebased| (code.clone(), rebased))
                    .ok_or(ExchangeError::Overflow)
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            base: base.clone(),
            rates,
        })
    }
}

/// Approximate USD-based rates used when no live quote is available.
pub fn fallback_rates() -> RateTable {
    let entry = |code: &str, rate: Decimal| (CurrencyCode(code.to_string()), rate);

    RateTable {
        base: CurrencyCode("USD".to_string()),
        rates: BTreeMap::from([
            entry("USD", Decimal::ONE),
            entry("KRW", Decimal::new(1350, 0)),
            entry("EUR", Decimal::new(92, 2)),
            entry("JPY", Decimal::new(150, 0)),
            entry("CNY", Decimal::new(72, 1)),
            entry("GBP", Decimal::new(79, 2)),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(code(" krw ").as_str(), "KRW");
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        for bad in ["", "US", "USDT", "U$D", "12A"] {
            assert_eq!(
                CurrencyCode::parse(bad),
                Err(ExchangeError::InvalidCode(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn convert_from_base() {
        let rates = fallback_rates();

        assert_eq!(
            rates.convert(dec!(100), &code("USD"), &code("KRW")).unwrap(),
            dec!(135000.00)
        );
    }

    #[test]
    fn convert_between_two_quoted_currencies() {
        let rates = fallback_rates();

        // 10000 KRW -> USD -> JPY: 10000 / 1350 * 150 = 1111.11
        assert_eq!(
            rates.convert(dec!(10000), &code("KRW"), &code("JPY")).unwrap(),
            dec!(1111.11)
        );
    }

    #[test]
    fn convert_same_currency_is_identity() {
        let rates = fallback_rates();

        assert_eq!(
            rates.convert(dec!(42.5), &code("EUR"), &code("EUR")).unwrap(),
            dec!(42.50)
        );
    }

    #[test]
    fn convert_unknown_currency_fails() {
        let rates = fallback_rates();

        assert_eq!(
            rates.convert(dec!(1), &code("USD"), &code("CHF")),
            Err(ExchangeError::UnknownCurrency(code("CHF")))
        );
    }

    #[test]
    fn convert_rejects_negative_amount() {
        assert_eq!(
            fallback_rates().convert(dec!(-1), &code("USD"), &code("KRW")),
            Err(ExchangeError::NegativeAmount(dec!(-1)))
        );
    }

    #[test]
    fn convert_reports_overflow_instead_of_panicking() {
        let rates = fallback_rates();
        let huge = Decimal::from_i128_with_scale(7 * 10_i128.pow(28), 0);

        assert_eq!(
            rates.convert(huge, &code("GBP"), &code("USD")),
            Err(ExchangeError::Overflow)
        );
        assert_eq!(
            rates.convert(huge, &code("USD"), &code("KRW")),
            Err(ExchangeError::Overflow)
        );
    }

    #[test]
    fn rebase_reports_overflow_for_tiny_pivot() {
        let table = RateTable::new(
            code("USD"),
            [
                (code("XAU"), Decimal::new(1, 28)),
                (code("KRW"), Decimal::new(1350, 0)),
            ],
        )
        .unwrap();

        assert_eq!(table.rebase(&code("XAU")), Err(ExchangeError::Overflow));
    }

    #[test]
    fn new_inserts_base_and_rejects_zero_rate() {
        let table = RateTable::new(code("EUR"), [(code("USD"), dec!(1.09))]).unwrap();
        assert_eq!(table.rate(&code("EUR")).unwrap(), dec!(1));

        assert_eq!(
            RateTable::new(code("EUR"), [(code("USD"), dec!(0))]),
            Err(ExchangeError::NonPositiveRate {
                code: code("USD"),
                rate: dec!(0),
            })
        );
    }

    #[test]
    fn rebase_preserves_cross_rates() {
        let usd = fallback_rates();
        let krw = usd.rebase(&code("KRW")).unwrap();

        assert_eq!(krw.base(), &code("KRW"));
        assert_eq!(krw.rate(&code("KRW")).unwrap(), dec!(1));
        assert_eq!(
            krw.convert(dec!(100), &code("USD"), &code("KRW")).unwrap(),
            usd.convert(dec!(100), &code("USD"), &code("KRW")).unwrap()
        );
    }

    #[test]
    fn currency_code_serde_validates() {
        let parsed: Result<CurrencyCode, _> = serde_json::from_str("\"usd\"");
        assert_eq!(parsed.unwrap(), code("USD"));

        let bad: Result<CurrencyCode, _> = serde_json::from_str("\"dollars\"");
        assert!(bad.is_err());
    }
}
