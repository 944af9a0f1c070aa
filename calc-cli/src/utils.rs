use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes
/// thousands separators and the won sign.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '₩'], "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
/// Returns an error and logs when the input is invalid (non-empty but not parseable).
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a money amount, clamping negative values to zero.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseDecimalError> {
    let value = parse_decimal(s)?;
    if value < Decimal::ZERO {
        tracing::warn!(input = %s, "negative amount clamped to 0");
        return Ok(Decimal::ZERO);
    }
    Ok(value)
}

/// Parses a rate given either as a fraction (`0.033`) or a percentage
/// (`3.3%`).
pub fn parse_rate(s: &str) -> Result<Decimal, ParseDecimalError> {
    match s.trim().strip_suffix('%') {
        Some(percent) => Ok(parse_decimal(percent)? / Decimal::ONE_HUNDRED),
        None => parse_decimal(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("30,000,000").unwrap(), dec!(30000000));
    }

    #[test]
    fn parse_decimal_strips_won_sign() {
        assert_eq!(parse_decimal("₩1,500,000").unwrap(), dec!(1500000));
    }

    #[test]
    fn parse_decimal_trim_whitespace() {
        assert_eq!(parse_decimal("  123.45  ").unwrap(), dec!(123.45));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("12a").is_err());
    }

    #[test]
    fn parse_amount_clamps_negative_to_zero() {
        assert_eq!(parse_amount("-5,000").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("5,000").unwrap(), dec!(5000));
    }

    #[test]
    fn parse_rate_accepts_fraction_and_percent() {
        assert_eq!(parse_rate("0.033").unwrap(), dec!(0.033));
        assert_eq!(parse_rate("3.3%").unwrap(), dec!(0.033));
        assert_eq!(parse_rate(" 64.1 % ").unwrap(), dec!(0.641));
    }
}
