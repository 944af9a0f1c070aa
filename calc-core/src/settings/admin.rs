//! Site-wide admin settings and the password gate for changing them.
//!
//! The gate keeps honest users out of the admin commands. It is not a
//! security boundary: the password lives in plain configuration.

use thiserror::Error;
use tracing::{debug, warn};

use super::store::{SettingsError, SettingsStore};

pub const ADS_ENABLED_KEY: &str = "ads.enabled";
pub const AD_SNIPPET_KEY: &str = "ads.snippet";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("Admin password is not configured")]
    NotConfigured,

    #[error("Incorrect admin password")]
    WrongPassword,
}

/// Proof that [`AdminGate::unlock`] succeeded. Only the gate can create one.
#[derive(Debug)]
pub struct AdminSession {
    _private: (),
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    password: String,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// # Errors
    ///
    /// Returns [`AdminError::NotConfigured`] when the gate was built with an
    /// empty password, and [`AdminError::WrongPassword`] on a mismatch.
    pub fn unlock(
        &self,
        attempt: &str,
    ) -> Result<AdminSession, AdminError> {
        if self.password.is_empty() {
            return Err(AdminError::NotConfigured);
        }
        if attempt != self.password {
            warn!("Rejected admin unlock attempt");
            return Err(AdminError::WrongPassword);
        }
        debug!("Admin session unlocked");
        Ok(AdminSession { _private: () })
    }
}

/// Advertising toggle and the markup shown when it is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSettings {
    pub ads_enabled: bool,
    pub ad_snippet: String,
}

impl AdminSettings {
    /// Reads the settings, falling back to defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] if the stored flag is not a
    /// boolean, or whatever the store reports.
    pub fn load(store: &dyn SettingsStore) -> Result<Self, SettingsError> {
        let ads_enabled = match store.get(ADS_ENABLED_KEY)? {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| SettingsError::InvalidValue {
                key: ADS_ENABLED_KEY.to_string(),
                value: raw,
            })?,
        };
        let ad_snippet = store.get(AD_SNIPPET_KEY)?.unwrap_or_default();

        Ok(Self {
            ads_enabled,
            ad_snippet,
        })
    }

    /// Writes the settings back. Requires an unlocked session.
    pub fn save(
        &self,
        store: &mut dyn SettingsStore,
        _session: &AdminSession,
    ) -> Result<(), SettingsError> {
        store.set_all(&[
            (ADS_ENABLED_KEY, if self.ads_enabled { "true" } else { "false" }),
            (AD_SNIPPET_KEY, self.ad_snippet.as_str()),
        ])?;
        debug!(ads_enabled = self.ads_enabled, "Saved admin settings");
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}
