use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use calc_core::settings::{SettingsError, SettingsStore};
use tracing::debug;

/// [`SettingsStore`] persisted as a flat TOML table of strings.
///
/// The file is read once on open and rewritten in full on every write. The
/// in-memory values change only after the file has been written.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileSettingsStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
            toml::from_str(&text).map_err(|e| storage_error(&path, e))?
        } else {
            debug!(path = %path.display(), "No settings file yet");
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(
        &mut self,
        values: BTreeMap<String, String>,
    ) -> Result<(), SettingsError> {
        let text = toml::to_string(&values).map_err(|e| storage_error(&self.path, e))?;
        std::fs::write(&self.path, text).map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), keys = values.len(), "Saved settings file");
        self.values = values;
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
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
        self.set_all(&[(key, value)])
    }

    fn set_all(
        &mut self,
        entries: &[(&str, &str)],
    ) -> Result<(), SettingsError> {
        let mut values = self.values.clone();
        values.extend(entries.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self.persist(values)
    }
}

fn storage_error(
    path: &Path,
    err: impl std::fmt::Display,
) -> SettingsError {
    SettingsError::Storage(format!("{}: {err}", path.display()))
}
