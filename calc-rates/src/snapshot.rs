use calc_core::calculations::{CurrencyCode, ExchangeError, RateTable};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Where a [`RateSnapshot`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateSource {
    Live {
        fetched_at: DateTime<Utc>,
        /// Publication date reported by the provider, if any.
        quoted_on: Option<NaiveDate>,
    },
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSnapshot {
    pub table: RateTable,
    pub source: RateSource,
}

impl RateSnapshot {
    pub fn is_live(&self) -> bool {
        matches!(self.source, RateSource::Live { .. })
    }

    /// Freshness label shown next to converted amounts.
    pub fn label(&self) -> String {
        match &self.source {
            RateSource::Live { fetched_at, .. } => {
                format!("last updated: {}", fetched_at.format("%Y-%m-%d %H:%M UTC"))
            }
            RateSource::Fallback => "last updated: fallback".to_string(),
        }
    }

    pub fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<Decimal, ExchangeError> {
        self.table.convert(amount, from, to)
    }
}
