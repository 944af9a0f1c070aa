//! Plain-text rendering of calculator output.

use std::fmt::Write as _;

use calc_core::CalculatorOutput;
use num_format::{Locale, ToFormattedString as _};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rows of a loan schedule shown at each end when not rendering in full.
const SCHEDULE_PREVIEW_ROWS: usize = 3;

/// Formats `value` with thousands separators and exactly `dp` decimals.
///
/// Uses the en locale (`1,234,567.89`) regardless of currency.
pub fn format_amount(
    value: Decimal,
    dp: u32,
) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let abs = rounded.abs();

    let integer_part = abs
        .trunc()
        .to_i128()
        .unwrap_or_default()
        .to_formatted_string(&Locale::en);
    if dp == 0 {
        return format!("{sign}{integer_part}");
    }

    let scale = Decimal::from(10u64.pow(dp));
    let fractional_part = (abs.fract() * scale).trunc().to_u64().unwrap_or_default();
    format!(
        "{sign}{integer_part}.{fractional_part:0width$}",
        width = dp as usize
    )
}

/// Whole currency units, e.g. `1,440,000`.
pub fn won(value: Decimal) -> String {
    format_amount(value, 0)
}

/// Two decimals, e.g. `106,618.55`.
pub fn cents(value: Decimal) -> String {
    format_amount(value, 2)
}

/// A fractional rate as a percentage, e.g. `0.033` as `3.3%`.
pub fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Renders `output` as aligned label/value lines.
///
/// Loan schedules are abbreviated unless `full` is set.
pub fn render(
    output: &CalculatorOutput,
    full: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", output.title());
    let _ = writeln!(out, "{}", "-".repeat(output.title().chars().count()));

    match output {
        CalculatorOutput::ProgressiveTax {
            regime,
            year,
            taxable_amount,
            result,
        } => {
            line(&mut out, "Table", format!("{} {year}", regime.label()));
            line(&mut out, "Taxable amount", won(*taxable_amount));
            line(&mut out, "Marginal rate", percent(result.applied_rate));
            line(&mut out, "Tax", won(result.tax));
        }
        CalculatorOutput::Freelancer(r) => {
            line(&mut out, "Gross income", won(r.gross_income));
            line(&mut out, "Expenses", won(r.expenses));
            line(&mut out, "Taxable income", won(r.taxable_income));
            line(&mut out, "Marginal rate", percent(r.applied_rate));
            line(&mut out, "Income tax", won(r.income_tax));
            line(&mut out, "Local income tax", won(r.local_income_tax));
            line(&mut out, "Total tax", won(r.total_tax));
            line(&mut out, "Already withheld", won(r.prepaid_withholding));
            if r.is_refund() {
                line(&mut out, "Refund", won(-r.settlement));
            } else {
                line(&mut out, "Additional payment", won(r.settlement));
            }
            line(&mut out, "Net income", won(r.net_income));
        }
        CalculatorOutput::CompoundInterest(r) => {
            line(&mut out, "Final balance", cents(r.final_balance));
            line(&mut out, "Total contributions", cents(r.total_contributions));
            line(&mut out, "Total interest", cents(r.total_interest));
            let _ = writeln!(out);
            let _ = writeln!(out, "{:>4}  {:>20}  {:>20}  {:>20}", "Year", "Contributed", "Interest", "Balance");
            for p in &r.projection {
                let _ = writeln!(
                    out,
                    "{:>4}  {:>20}  {:>20}  {:>20}",
                    p.year,
                    cents(p.total_contributions),
                    cents(p.interest_earned),
                    cents(p.balance)
                );
            }
        }
        CalculatorOutput::Loan(r) => {
            line(&mut out, "Method", r.method.label().to_string());
            line(&mut out, "First payment", cents(r.first_payment));
            line(&mut out, "Total payment", cents(r.total_payment));
            line(&mut out, "Total interest", cents(r.total_interest));
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{:>5}  {:>16}  {:>16}  {:>16}  {:>18}",
                "Month", "Payment", "Principal", "Interest", "Remaining"
            );
            let rows = r.schedule.len();
            for (i, row) in r.schedule.iter().enumerate() {
                let shown = full || i < SCHEDULE_PREVIEW_ROWS || i >= rows.saturating_sub(SCHEDULE_PREVIEW_ROWS);
                if !shown {
                    if i == SCHEDULE_PREVIEW_ROWS {
                        let _ = writeln!(out, "{:>5}", "...");
                    }
                    continue;
                }
                let _ = writeln!(
                    out,
                    "{:>5}  {:>16}  {:>16}  {:>16}  {:>18}",
                    row.month,
                    cents(row.payment),
                    cents(row.principal),
                    cents(row.interest),
                    cents(row.remaining)
                );
            }
        }
        CalculatorOutput::Vat(b) => {
            line(&mut out, "Supply value", won(b.supply));
            line(&mut out, "VAT", format!("{} ({})", won(b.vat), percent(b.rate)));
            line(&mut out, "Total", won(b.total));
        }
        CalculatorOutput::Subnet(s) => {
            line(&mut out, "Address", s.address.to_string());
            line(&mut out, "Network", s.cidr());
            line(&mut out, "Netmask", s.netmask.to_string());
            line(&mut out, "Wildcard", s.wildcard.to_string());
            line(&mut out, "Broadcast", s.broadcast.to_string());
            line(&mut out, "Host range", format!("{} - {}", s.first_host, s.last_host));
            line(&mut out, "Total addresses", s.total_addresses.to_formatted_string(&Locale::en));
            line(&mut out, "Usable hosts", s.usable_hosts.to_formatted_string(&Locale::en));
            line(&mut out, "Class", format!("{:?}", s.class));
        }
        CalculatorOutput::Conversion {
            amount,
            from,
            to,
            converted,
            rate_source,
        } => {
            line(&mut out, "From", format!("{} {from}", cents(*amount)));
            line(&mut out, "To", format!("{} {to}", cents(*converted)));
            line(&mut out, "Rates", rate_source.clone());
        }
    }

    out
}

fn line(
    out: &mut String,
    label: &str,
    value: String,
) {
    let _ = writeln!(out, "{label:<20} {value:>24}");
}
