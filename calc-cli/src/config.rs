//! Application configuration read from an optional TOML file.
//!
//! Every section and every key is optional; missing values take the
//! defaults below.
//!
//! ```toml
//! [logging]
//! level = "info"
//! file = "calc.log"
//!
//! [rates]
//! base_url = "https://api.exchangerate-api.com/v4"
//! timeout_secs = 5
//! offline = false
//!
//! [admin]
//! password = "change-me"
//!
//! [settings]
//! path = "settings.toml"
//!
//! [freelancer]
//! withholding_rate = 0.033
//! local_tax_rate = 0.10
//! basic_deduction = 1500000
//!
//! [vat]
//! rate = 0.10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calc_core::calculations::common::is_fraction;
use calc_core::calculations::{FreelancerConfig, FreelancerError, default_vat_rate};
use calc_rates::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [freelancer] section: {0}")]
    Freelancer(#[from] FreelancerError),

    #[error("[vat] rate must be between 0 and 1, got {0}")]
    VatRate(Decimal),

    #[error("[rates] timeout_secs must be positive")]
    ZeroTimeout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub rates: RatesConfig,
    pub admin: AdminConfig,
    pub settings: SettingsConfig,
    pub freelancer: FreelancerConfig,
    pub vat: VatConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Skip the network and always use the built-in rates.
    pub offline: bool,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            offline: false,
        }
    }
}

impl RatesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Empty disables the admin commands.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("calc-settings.toml"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VatConfig {
    pub rate: Decimal,
}

impl Default for VatConfig {
    fn default() -> Self {
        Self {
            rate: default_vat_rate(),
        }
    }
}

impl AppConfig {
    /// Reads and validates the config at `path`. A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file; using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.freelancer.validate()?;
        if !is_fraction(self.vat.rate) {
            return Err(ConfigError::VatRate(self.vat.rate));
        }
        if self.rates.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::parse("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.vat.rate, dec!(0.10));
        assert_eq!(config.freelancer, FreelancerConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::parse(
            r#"
            [rates]
            timeout_secs = 2

            [freelancer]
            basic_deduction = 2000000
            "#,
        )
        .unwrap();

        assert_eq!(config.rates.timeout(), Duration::from_secs(2));
        assert_eq!(config.rates.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.freelancer.basic_deduction, dec!(2000000));
        assert_eq!(config.freelancer.withholding_rate, dec!(0.033));
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[admin]\npassword = \"s3cret\"\n[logging]\nlevel = \"debug\"").unwrap();

        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(config.admin.password, "s3cret");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[rates\ntimeout_secs = ").unwrap();

        let err = AppConfig::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validate_rejects_percentage_style_vat_rate() {
        let config = AppConfig::parse("[vat]\nrate = 10").unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::VatRate(_))));
    }

    #[test]
    fn validate_rejects_bad_freelancer_rate() {
        let config = AppConfig::parse("[freelancer]\nlocal_tax_rate = 1.5").unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Freelancer(FreelancerError::InvalidLocalTaxRate(_)))
        ));
    }
}
