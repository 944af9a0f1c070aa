use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Flat string key/value storage for application settings.
///
/// Implementations decide where values live; callers read once at startup
/// and write back only on an explicit save.
pub trait SettingsStore: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, SettingsError>;

    fn set(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError>;

    /// Writes several values as one change. Stores that persist should
    /// either apply every entry or none.
    fn set_all(
        &mut self,
        entries: &[(&str, &str)],
    ) -> Result<(), SettingsError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// In-process store, used by tests and when no settings file is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
