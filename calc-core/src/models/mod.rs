mod bracket;
mod bracket_table;
mod calculation_result;
mod calculator_output;
mod tax_regime;

pub use bracket::Bracket;
pub use bracket_table::{BracketTable, BracketTableError};
pub use calculation_result::CalculationResult;
pub use calculator_output::CalculatorOutput;
pub use tax_regime::TaxRegime;
