//! Command-line definition.

use std::path::PathBuf;

use calc_core::TaxRegime;
use calc_core::calculations::{CompoundingFrequency, RepaymentMethod};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::utils::{parse_amount, parse_rate};

/// Everyday calculators: progressive tax, freelancer settlement, VAT,
/// compound interest, loans, currency conversion and IPv4 subnets.
#[derive(Debug, Parser)]
#[command(name = "calc", version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file. A missing file means defaults.
    #[arg(long, global = true, default_value = "calc.toml")]
    pub config: PathBuf,

    /// Log level or filter directive; overrides the config file.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Append log records to this file as well.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Hide log output on the console.
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Print results as JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List calculators, optionally filtered by a search term.
    List {
        query: Option<String>,
    },
    /// Tax owed on a taxable amount under a progressive table.
    Tax(TaxArgs),
    /// Year-end settlement for income withheld at 3.3%.
    Freelancer(FreelancerArgs),
    /// Compound interest with a yearly projection.
    Compound(CompoundArgs),
    /// Loan repayment schedule.
    Loan(LoanArgs),
    /// Split an amount into supply value and VAT.
    Vat(VatArgs),
    /// IPv4 subnet details.
    Subnet(SubnetArgs),
    /// Convert between currencies.
    Exchange(ExchangeArgs),
    /// List and validate bracket tables.
    Tables(TablesArgs),
    /// Manage site settings (requires the admin password).
    Admin(AdminArgs),
}

/// Bracket table selection shared by the tax calculators.
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Tax year; defaults to the latest table available.
    #[arg(long)]
    pub year: Option<i32>,

    /// Extra bracket tables to load from CSV before calculating.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct TaxArgs {
    /// Taxable amount after deductions.
    #[arg(value_parser = parse_amount)]
    pub amount: Decimal,

    /// Table to apply: `income` or `freelancer`.
    #[arg(long, default_value = "income", value_parser = parse_regime)]
    pub regime: TaxRegime,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Args)]
pub struct FreelancerArgs {
    /// Gross income for the year.
    #[arg(long, value_parser = parse_amount)]
    pub gross: Decimal,

    /// Share of gross income treated as expenses (`0.641` or `64.1%`).
    #[arg(long, value_parser = parse_rate)]
    pub expense_ratio: Decimal,

    /// Deductions beyond the basic deduction.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub deductions: Decimal,

    /// Tax actually withheld; defaults to the withholding rate times gross.
    #[arg(long, value_parser = parse_amount)]
    pub prepaid: Option<Decimal>,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Debug, Args)]
pub struct CompoundArgs {
    #[arg(long, value_parser = parse_amount)]
    pub principal: Decimal,

    /// Annual rate (`0.05` or `5%`).
    #[arg(long, value_parser = parse_rate)]
    pub rate: Decimal,

    #[arg(long)]
    pub years: u32,

    /// `annually`, `quarterly` or `monthly`.
    #[arg(long, default_value = "annually", value_parser = parse_frequency)]
    pub frequency: CompoundingFrequency,

    /// Deposit at the end of each compounding period.
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub contribution: Decimal,
}

#[derive(Debug, Args)]
pub struct LoanArgs {
    #[arg(long, value_parser = parse_amount)]
    pub principal: Decimal,

    /// Annual rate (`0.045` or `4.5%`).
    #[arg(long, value_parser = parse_rate)]
    pub rate: Decimal,

    #[arg(long)]
    pub months: u32,

    /// `equal-payment`, `equal-principal` or `bullet`.
    #[arg(long, default_value = "equal-payment", value_parser = parse_method)]
    pub method: RepaymentMethod,

    /// Print every installment instead of the first and last few.
    #[arg(long, default_value_t = false)]
    pub full: bool,
}

#[derive(Debug, Args)]
pub struct VatArgs {
    #[arg(value_parser = parse_amount)]
    pub amount: Decimal,

    /// The amount already includes VAT.
    #[arg(long, default_value_t = false)]
    pub inclusive: bool,

    /// VAT rate; defaults to the configured rate.
    #[arg(long, value_parser = parse_rate)]
    pub rate: Option<Decimal>,
}

#[derive(Debug, Args)]
pub struct SubnetArgs {
    /// `a.b.c.d/prefix`, or a bare address together with `--mask`.
    pub address: String,

    /// Dotted netmask such as `255.255.255.0`.
    #[arg(long)]
    pub mask: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExchangeArgs {
    #[arg(value_parser = parse_amount)]
    pub amount: Decimal,

    /// Source currency code, e.g. `USD`.
    pub from: String,

    /// Target currency code, e.g. `KRW`.
    pub to: String,

    /// Use the built-in rates without contacting the rate service.
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

#[derive(Debug, Args)]
pub struct TablesArgs {
    /// Also load and validate tables from this CSV file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Print every bracket.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Admin password, checked against the config file.
    #[arg(long)]
    pub password: String,

    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// Show the current settings.
    Show,
    /// Turn ads on, optionally replacing the ad snippet.
    EnableAds {
        #[arg(long)]
        snippet: Option<String>,
    },
    /// Turn ads off.
    DisableAds,
}

fn parse_regime(s: &str) -> Result<TaxRegime, String> {
    TaxRegime::parse(s).ok_or_else(|| format!("unknown regime '{s}' (expected 'income' or 'freelancer')"))
}

fn parse_frequency(s: &str) -> Result<CompoundingFrequency, String> {
    CompoundingFrequency::parse(s)
        .ok_or_else(|| format!("unknown frequency '{s}' (expected annually, quarterly or monthly)"))
}

fn parse_method(s: &str) -> Result<RepaymentMethod, String> {
    RepaymentMethod::parse(s).ok_or_else(|| {
        format!("unknown method '{s}' (expected equal-payment, equal-principal or bullet)")
    })
}
