//! Runs each subcommand against the calculator library.
//!
//! Every calculator turns its arguments into a [`CalculatorOutput`]; listing,
//! table inspection and admin commands produce text directly.

use std::fmt::Write as _;
use std::fs::File;
use std::net::Ipv4Addr;
use std::path::Path;

use anyhow::{Context, Result};
use calc_core::calculations::{
    CompoundInterestInput, CurrencyCode, FreelancerConfig, FreelancerInput, FreelancerWorksheet,
    LoanInput, ProgressiveTaxResolver, SubnetInfo, VatBreakdown, compound, deduction_drift, loan,
};
use calc_core::settings::{AdminGate, AdminSettings, SettingsStore};
use calc_core::{BracketTable, BracketTableRegistry, CalculatorOutput, TaxRegime};
use calc_data::BracketTableLoader;
use calc_rates::{ExchangeRateService, HttpRateProvider};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::catalog::{self, CalculatorPage, FieldKind};
use crate::render;
use crate::cli::{
    AdminAction, AdminArgs, CompoundArgs, ExchangeArgs, FreelancerArgs, LoanArgs, SubnetArgs,
    TableArgs, TablesArgs, TaxArgs, VatArgs,
};
use crate::config::{AppConfig, RatesConfig};

/// Built-in tables plus any loaded from `extra`.
pub fn build_registry(extra: Option<&Path>) -> Result<BracketTableRegistry> {
    let mut registry = BracketTableRegistry::with_builtin_tables();

    if let Some(path) = extra {
        let file = File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = BracketTableLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let loaded = BracketTableLoader::load(&mut registry, &records)
            .with_context(|| format!("Invalid bracket tables in {}", path.display()))?;
        info!(path = %path.display(), tables = loaded, "Loaded bracket tables");
    }

    Ok(registry)
}

fn select_table<'r>(
    registry: &'r BracketTableRegistry,
    regime: TaxRegime,
    year: Option<i32>,
) -> Result<&'r BracketTable> {
    let table = match year {
        Some(year) => registry.get(regime, year)?,
        None => registry.latest(regime)?,
    };
    debug!(%regime, year = table.year(), "Selected bracket table");
    Ok(table)
}

/// Catalog listing. A query naming a calculator exactly shows that page's
/// fields in detail instead of a search result.
pub fn list(query: Option<&str>) -> String {
    let query = query.unwrap_or_default().trim();
    if let Some(page) = catalog::find(query) {
        return describe(page);
    }

    let pages = catalog::search(query);
    if pages.is_empty() {
        return format!("No calculators match '{query}'.\n");
    }

    let mut out = String::new();
    for page in pages {
        let _ = writeln!(out, "{:<12} {:<10} {}", page.id, page.category, page.title);
        for field in page.fields {
            let _ = writeln!(
                out,
                "{:<12}   --{:<16} {}{}",
                "",
                field.name,
                field.label,
                if field.required { "" } else { " (optional)" }
            );
        }
    }
    out
}

fn describe(page: &CalculatorPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", page.title, page.category);
    let _ = writeln!(out, "usage: calc {} ...", page.id);
    let _ = writeln!(out, "keywords: {}", page.keywords.join(", "));
    for field in page.fields {
        let kind = match field.kind {
            FieldKind::Amount => "amount".to_string(),
            FieldKind::Rate => "rate".to_string(),
            FieldKind::Count => "count".to_string(),
            FieldKind::Text => "text".to_string(),
            FieldKind::Choice(choices) => choices.join(" | "),
        };
        let _ = writeln!(
            out,
            "  {:<16} {:<24} {}{}",
            field.name,
            field.label,
            kind,
            if field.required { "" } else { ", optional" }
        );
    }
    out
}

pub fn tax(args: &TaxArgs) -> Result<CalculatorOutput> {
    let registry = build_registry(args.table.tables.as_deref())?;
    tax_with(&registry, args.regime, args.amount, &args.table)
}

fn tax_with(
    registry: &BracketTableRegistry,
    regime: TaxRegime,
    amount: Decimal,
    table_args: &TableArgs,
) -> Result<CalculatorOutput> {
    let table = select_table(registry, regime, table_args.year)?;
    let result = ProgressiveTaxResolver::new(table).resolve(amount);

    Ok(CalculatorOutput::ProgressiveTax {
        regime,
        year: table.year(),
        taxable_amount: amount,
        result,
    })
}

pub fn freelancer(
    args: &FreelancerArgs,
    config: &FreelancerConfig,
) -> Result<CalculatorOutput> {
    let registry = build_registry(args.table.tables.as_deref())?;
    let table = select_table(&registry, TaxRegime::FreelancerWithholding, args.table.year)?;
    let worksheet = FreelancerWorksheet::new(table, config.clone())?;

    let result = worksheet.calculate(&FreelancerInput {
        gross_income: args.gross,
        expense_ratio: args.expense_ratio,
        additional_deductions: args.deductions,
        prepaid_withholding: args.prepaid,
    })?;

    Ok(CalculatorOutput::Freelancer(result))
}

pub fn compound_interest(args: &CompoundArgs) -> Result<CalculatorOutput> {
    let result = compound::project(&CompoundInterestInput {
        principal: args.principal,
        annual_rate: args.rate,
        years: args.years,
        frequency: args.frequency,
        periodic_contribution: args.contribution,
    })?;

    Ok(CalculatorOutput::CompoundInterest(result))
}

pub fn loan_schedule(args: &LoanArgs) -> Result<CalculatorOutput> {
    let result = loan::amortize(&LoanInput {
        principal: args.principal,
        annual_rate: args.rate,
        months: args.months,
        method: args.method,
    })?;

    Ok(CalculatorOutput::Loan(result))
}

pub fn vat(
    args: &VatArgs,
    default_rate: Decimal,
) -> Result<CalculatorOutput> {
    let rate = args.rate.unwrap_or(default_rate);
    let breakdown = if args.inclusive {
        VatBreakdown::from_total(args.amount, rate)?
    } else {
        VatBreakdown::from_supply(args.amount, rate)?
    };

    Ok(CalculatorOutput::Vat(breakdown))
}

pub fn subnet(args: &SubnetArgs) -> Result<CalculatorOutput> {
    let info = match &args.mask {
        Some(mask) => {
            let address: Ipv4Addr = args
                .address
                .trim()
                .parse()
                .with_context(|| format!("invalid IPv4 address '{}'", args.address))?;
            let mask: Ipv4Addr = mask
                .trim()
                .parse()
                .with_context(|| format!("invalid netmask '{mask}'"))?;
            SubnetInfo::from_address_and_mask(address, mask)?
        }
        None => SubnetInfo::from_cidr(&args.address)?,
    };

    Ok(CalculatorOutput::Subnet(info))
}

pub fn rate_service(
    config: &RatesConfig,
    offline: bool,
) -> Result<ExchangeRateService> {
    if offline || config.offline {
        return Ok(ExchangeRateService::offline());
    }
    let provider = HttpRateProvider::new(config.base_url.clone(), config.timeout())
        .context("Failed to build HTTP client")?;
    Ok(ExchangeRateService::new(Box::new(provider)))
}

pub async fn exchange(
    args: &ExchangeArgs,
    service: &ExchangeRateService,
) -> Result<CalculatorOutput> {
    let from = CurrencyCode::parse(&args.from)?;
    let to = CurrencyCode::parse(&args.to)?;

    let snapshot = service.quote(&from, &to).await;
    let converted = snapshot.convert(args.amount, &from, &to)?;

    Ok(CalculatorOutput::Conversion {
        amount: args.amount,
        from,
        to,
        converted,
        rate_source: snapshot.label(),
    })
}

pub fn tables(args: &TablesArgs) -> Result<String> {
    let registry = build_registry(args.file.as_deref())?;

    let mut out = String::new();
    for table in registry.tables() {
        let drift = deduction_drift(table);
        let _ = writeln!(
            out,
            "{:<11} {}  {} brackets{}",
            table.regime().as_str(),
            table.year(),
            table.brackets().len(),
            if drift.is_empty() {
                String::new()
            } else {
                format!("  ({} tiers with deduction drift)", drift.len())
            }
        );

        if args.verbose {
            for bracket in table.brackets() {
                let upper = bracket
                    .upper_bound
                    .map_or_else(|| "unbounded".to_string(), render::won);
                let _ = writeln!(
                    out,
                    "    {:>15} - {:<15} {:>6}  deduction {:>12}",
                    render::won(bracket.lower_bound),
                    upper,
                    render::percent(bracket.rate),
                    render::won(bracket.cumulative_deduction)
                );
            }
            for d in &drift {
                let _ = writeln!(
                    out,
                    "    tier {} deduction {} differs from derived {} (tax {} above marginal sum)",
                    d.index,
                    render::won(d.actual),
                    render::won(d.expected),
                    render::won(d.excess())
                );
            }
        }
    }
    Ok(out)
}

pub fn admin(
    args: &AdminArgs,
    config: &AppConfig,
    store: &mut dyn SettingsStore,
) -> Result<String> {
    let session = AdminGate::new(config.admin.password.clone()).unlock(&args.password)?;
    let mut settings = AdminSettings::load(store)?;

    match &args.action {
        AdminAction::Show => {}
        AdminAction::EnableAds { snippet } => {
            settings.ads_enabled = true;
            if let Some(snippet) = snippet {
                settings.ad_snippet = snippet.clone();
            }
            settings.save(store, &session)?;
        }
        AdminAction::DisableAds => {
            settings.ads_enabled = false;
            settings.save(store, &session)?;
        }
    }

    Ok(format!(
        "ads enabled: {}\nad snippet:  {}\n",
        settings.ads_enabled,
        if settings.ad_snippet.is_empty() {
            "(none)"
        } else {
            &settings.ad_snippet
        }
    ))
}
