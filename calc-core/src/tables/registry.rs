use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{BracketTable, TaxRegime};
use crate::tables::builtin;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no {regime} bracket table for {year}; available years: {available:?}")]
    NotFound {
        regime: TaxRegime,
        year: i32,
        available: Vec<i32>,
    },

    #[error("no {0} bracket table registered")]
    NoTables(TaxRegime),
}

/// Identifies one table: a regime plus the year it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey {
    pub regime: TaxRegime,
    pub year: i32,
}

impl TableKey {
    pub fn of(table: &BracketTable) -> Self {
        Self {
            regime: table.regime(),
            year: table.year(),
        }
    }
}

/// Registry of [`BracketTable`]s, keyed by regime and year.
///
/// Typical lifetime:
/// 1. Create with `BracketTableRegistry::with_builtin_tables()`.
/// 2. Call `register` for any table loaded from CSV; it overrides a built-in
///    table with the same key.
/// 3. Call `get` or `latest` whenever a calculator needs a table.
#[derive(Debug, Clone, Default)]
pub struct BracketTableRegistry {
    tables: BTreeMap<TableKey, BracketTable>,
}

impl BracketTableRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every table from [`builtin::all`].
    pub fn with_builtin_tables() -> Self {
        let mut registry = Self::new();
        for table in builtin::all() {
            registry.register(table);
        }
        registry
    }

    /// Register a table, returning the table it replaced, if any.
    pub fn register(
        &mut self,
        table: BracketTable,
    ) -> Option<BracketTable> {
        let key = TableKey::of(&table);
        let replaced = self.tables.insert(key, table);
        if replaced.is_some() {
            debug!(regime = %key.regime, year = key.year, "replaced bracket table");
        }
        replaced
    }

    /// Look up the table for `regime` in `year`.
    ///
    /// # Errors
    /// * [`RegistryError::NotFound`]: nothing registered for that year; the
    ///   error lists the years that are available for the regime.
    pub fn get(
        &self,
        regime: TaxRegime,
        year: i32,
    ) -> Result<&BracketTable, RegistryError> {
        self.tables
            .get(&TableKey { regime, year })
            .ok_or_else(|| RegistryError::NotFound {
                regime,
                year,
                available: self.years(regime),
            })
    }

    /// The table for the most recent year registered for `regime`.
    ///
    /// # Errors
    /// * [`RegistryError::NoTables`]: nothing registered for the regime.
    pub fn latest(
        &self,
        regime: TaxRegime,
    ) -> Result<&BracketTable, RegistryError> {
        self.tables
            .values()
            .filter(|t| t.regime() == regime)
            .max_by_key(|t| t.year())
            .ok_or(RegistryError::NoTables(regime))
    }

    /// Years registered for `regime`, ascending.
    pub fn years(
        &self,
        regime: TaxRegime,
    ) -> Vec<i32> {
        self.tables
            .keys()
            .filter(|k| k.regime == regime)
            .map(|k| k.year)
            .collect()
    }

    /// Every registered key, sorted by regime then year.
    pub fn available(&self) -> Vec<TableKey> {
        self.tables.keys().copied().collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &BracketTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
