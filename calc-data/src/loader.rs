use std::io::Read;

use calc_core::calculations::deduction_drift;
use calc_core::{Bracket, BracketTable, BracketTableError, BracketTableRegistry, TaxRegime};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading bracket table data.
#[derive(Debug, Error)]
pub enum BracketTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown regime '{0}' (expected 'freelancer' or 'income')")]
    UnknownRegime(String),

    #[error("Invalid {regime} table for {year}: {source}")]
    InvalidTable {
        regime: TaxRegime,
        year: i32,
        #[source]
        source: BracketTableError,
    },
}

impl From<csv::Error> for BracketTableLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single row from a bracket table CSV file.
///
/// - `regime`: regime code (`freelancer` or `income`)
/// - `tax_year`: the year the table applies to (e.g., 2024)
/// - `lower_bound`: inclusive lower bound of the bracket
/// - `upper_bound`: exclusive upper bound (empty for unbounded)
/// - `rate`: the marginal rate as a decimal (e.g., 0.15 for 15%)
/// - `cumulative_deduction`: constant subtracted from `amount * rate`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketTableRecord {
    pub regime: String,
    pub tax_year: i32,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub cumulative_deduction: Decimal,
}

impl BracketTableRecord {
    fn bracket(&self) -> Bracket {
        Bracket {
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            rate: self.rate,
            cumulative_deduction: self.cumulative_deduction,
        }
    }
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for bracket tables from CSV files.
///
/// Rows are grouped by `(regime, tax_year)`; within a group, rows keep
/// their file order and become the table's brackets. Every group goes
/// through the validating [`BracketTable::new`], so a malformed file never
/// produces a table.
pub struct BracketTableLoader;

impl BracketTableLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketTableRecord>, BracketTableLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketTableRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records into validated tables, in order of first appearance.
    pub fn build_tables(
        records: &[BracketTableRecord]
    ) -> Result<Vec<BracketTable>, BracketTableLoaderError> {
        let mut groups: Vec<((TaxRegime, i32), Vec<Bracket>)> = Vec::new();

        for record in records {
            let regime = TaxRegime::parse(&record.regime)
                .ok_or_else(|| BracketTableLoaderError::UnknownRegime(record.regime.clone()))?;
            let key = (regime, record.tax_year);

            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, brackets)) => brackets.push(record.bracket()),
                None => groups.push((key, vec![record.bracket()])),
            }
        }

        groups
            .into_iter()
            .map(|((regime, year), brackets)| {
                BracketTable::new(regime, year, brackets).map_err(|source| {
                    BracketTableLoaderError::InvalidTable {
                        regime,
                        year,
                        source,
                    }
                })
            })
            .collect()
    }

    /// Validate every table in `records` and register them.
    ///
    /// Nothing is registered unless every table is valid. A table replaces
    /// any table already registered for the same regime and year. Tables
    /// whose deductions drift from the marginal-rate derivation are accepted
    /// but logged, since their tax function is discontinuous.
    ///
    /// Returns the number of tables registered.
    pub fn load(
        registry: &mut BracketTableRegistry,
        records: &[BracketTableRecord],
    ) -> Result<usize, BracketTableLoaderError> {
        let tables = Self::build_tables(records)?;
        let count = tables.len();

        for table in tables {
            for drift in deduction_drift(&table) {
                warn!(
                    regime = %table.regime(),
                    year = table.year(),
                    tier = drift.index,
                    expected = %drift.expected,
                    actual = %drift.actual,
                    "Cumulative deduction does not match marginal rates"
                );
            }
            debug!(
                regime = %table.regime(),
                year = table.year(),
                brackets = table.brackets().len(),
                "Registering bracket table"
            );
            registry.register(table);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "regime,tax_year,lower_bound,upper_bound,rate,cumulative_deduction";

    const TWO_TIER_CSV: &str = r#"regime,tax_year,lower_bound,upper_bound,rate,cumulative_deduction
income,2030,0,10000000,0.10,0
income,2030,10000000,,0.20,1000000
"#;

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = format!("{HEADER}\nincome,2024,0,14000000,0.06,0");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            BracketTableRecord {
                regime: "income".to_string(),
                tax_year: 2024,
                lower_bound: dec!(0),
                upper_bound: Some(dec!(14000000)),
                rate: dec!(0.06),
                cumulative_deduction: dec!(0),
            }
        );
    }

    #[test]
    fn test_parse_csv_unbounded_upper() {
        let csv = format!("{HEADER}\nincome,2024,1000000000,,0.45,65940000");

        let records = BracketTableLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].upper_bound, None);
        assert_eq!(records[0].cumulative_deduction, dec!(65940000));
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "regime,tax_year,lower_bound\nincome,2024,0";

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let BracketTableLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = format!("{HEADER}\nincome,2024,abc,14000000,0.06,0");

        let err = BracketTableLoader::parse(csv.as_bytes()).expect_err("Should fail for invalid decimal");

        assert!(matches!(err, BracketTableLoaderError::CsvParse(_)));
    }

    #[test]
    fn test_build_tables_groups_by_regime_and_year() {
        let records = BracketTableLoader::parse(TWO_TIER_CSV.as_bytes()).unwrap();

        let tables = BracketTableLoader::build_tables(&records).unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].regime(), TaxRegime::ComprehensiveIncome);
        assert_eq!(tables[0].year(), 2030);
        assert_eq!(tables[0].brackets().len(), 2);
        assert_eq!(tables[0].brackets()[1].upper_bound, None);
    }

    #[test]
    fn test_build_tables_rejects_unknown_regime() {
        let csv = format!("{HEADER}\npayroll,2024,0,,0.10,0");
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let err = BracketTableLoader::build_tables(&records).unwrap_err();

        let BracketTableLoaderError::UnknownRegime(code) = err else {
            panic!("Expected UnknownRegime error, got: {:?}", err);
        };
        assert_eq!(code, "payroll");
    }

    #[test]
    fn test_build_tables_rejects_gap_between_brackets() {
        let csv = format!(
            "{HEADER}\nincome,2030,0,10000000,0.10,0\nincome,2030,12000000,,0.20,1000000"
        );
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let err = BracketTableLoader::build_tables(&records).unwrap_err();

        let BracketTableLoaderError::InvalidTable { source, year, .. } = err else {
            panic!("Expected InvalidTable error, got: {:?}", err);
        };
        assert_eq!(year, 2030);
        assert_eq!(
            source,
            BracketTableError::NotContiguous {
                index: 1,
                previous_upper: dec!(10000000),
                lower: dec!(12000000),
            }
        );
    }

    #[test]
    fn test_load_registers_tables() {
        let mut registry = BracketTableRegistry::new();
        let records = BracketTableLoader::parse(TWO_TIER_CSV.as_bytes()).unwrap();

        let loaded = BracketTableLoader::load(&mut registry, &records).unwrap();

        assert_eq!(loaded, 1);
        let table = registry
            .get(TaxRegime::ComprehensiveIncome, 2030)
            .expect("table should be registered");
        assert_eq!(table.brackets()[1].rate, dec!(0.20));
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let mut registry = BracketTableRegistry::new();
        let csv = format!(
            "{TWO_TIER_CSV}freelancer,2030,5,,0.03,0\n"
        );
        let records = BracketTableLoader::parse(csv.as_bytes()).unwrap();

        let result = BracketTableLoader::load(&mut registry, &records);

        assert!(result.is_err());
        assert!(registry.is_empty());
    }
}
