use calc_core::calculations::{CurrencyCode, fallback_rates};
use tracing::{debug, warn};

use crate::provider::RateProvider;
use crate::snapshot::{RateSnapshot, RateSource};

/// Serves exchange rates, preferring live quotes and falling back to the
/// built-in table whenever the provider fails.
pub struct ExchangeRateService {
    provider: Option<Box<dyn RateProvider>>,
}

impl ExchangeRateService {
    pub fn new(provider: Box<dyn RateProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A service that never goes to the network.
    pub fn offline() -> Self {
        Self { provider: None }
    }

    /// Latest rates quoted against `base`. Never fails.
    pub async fn latest(
        &self,
        base: &CurrencyCode,
    ) -> RateSnapshot {
        let Some(provider) = &self.provider else {
            debug!(%base, "Offline; using fallback rates");
            return fallback_snapshot(base);
        };

        match provider.fetch_latest(base).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%base, error = %e, "Exchange rate fetch failed; using fallback rates");
                fallback_snapshot(base)
            }
        }
    }

    /// Rates able to convert `from` into `to`. Never fails.
    ///
    /// Live rates that do not quote both currencies are replaced by the
    /// fallback table.
    pub async fn quote(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> RateSnapshot {
        let snapshot = self.latest(from).await;
        if !snapshot.is_live() {
            return snapshot;
        }

        match [from, to].into_iter().find(|code| snapshot.table.rate(code).is_err()) {
            Some(missing) => {
                warn!(%from, %to, %missing, "Live rates do not quote currency; using fallback rates");
                fallback_snapshot(from)
            }
            None => snapshot,
        }
    }
}

/// The static table, rebased to `base` when it quotes that currency.
fn fallback_snapshot(base: &CurrencyCode) -> RateSnapshot {
    let rates = fallback_rates();
    let table = match rates.rebase(base) {
        Ok(table) => table,
        Err(e) => {
            warn!(%base, error = %e, "Fallback table has no rate for base; keeping its own base");
            rates
        }
    };

    RateSnapshot {
        table,
        source: RateSource::Fallback,
    }
}
