use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use calc_cli::app;
use calc_cli::cli::{Cli, Command};
use calc_cli::config::AppConfig;
use calc_cli::logging::{LogTargets, init_logging};
use calc_cli::render::render;
use calc_cli::settings_file::FileSettingsStore;
use calc_core::CalculatorOutput;

// ─── output ──────────────────────────────────────────────────────────────────

enum Output {
    Result(CalculatorOutput),
    Text(String),
}

fn print(
    output: &Output,
    json: bool,
    full: bool,
) -> anyhow::Result<()> {
    match output {
        Output::Result(result) if json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        Output::Result(result) => print!("{}", render(result, full)),
        Output::Text(text) => print!("{text}"),
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

async fn run(
    cli: &Cli,
    config: &AppConfig,
) -> anyhow::Result<Output> {
    let output = match &cli.command {
        Command::List { query } => Output::Text(app::list(query.as_deref())),
        Command::Tax(args) => Output::Result(app::tax(args)?),
        Command::Freelancer(args) => Output::Result(app::freelancer(args, &config.freelancer)?),
        Command::Compound(args) => Output::Result(app::compound_interest(args)?),
        Command::Loan(args) => Output::Result(app::loan_schedule(args)?),
        Command::Vat(args) => Output::Result(app::vat(args, config.vat.rate)?),
        Command::Subnet(args) => Output::Result(app::subnet(args)?),
        Command::Exchange(args) => {
            let service = app::rate_service(&config.rates, args.offline)?;
            Output::Result(app::exchange(args, &service).await?)
        }
        Command::Tables(args) => Output::Text(app::tables(args)?),
        Command::Admin(args) => {
            let mut store = FileSettingsStore::open(&config.settings.path)
                .context("Failed to open settings file")?;
            Output::Text(app::admin(args, config, &mut store)?)
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;
    init_logging(&LogTargets {
        level: cli.log_level.as_deref().unwrap_or(&config.logging.level),
        console: !cli.quiet,
        file: cli.log_file.as_deref().or(config.logging.file.as_deref()),
    })?;
    debug!(config = %cli.config.display(), command = ?cli.command, "Starting");

    let full = matches!(&cli.command, Command::Loan(args) if args.full);
    match run(&cli, &config).await {
        Ok(output) => print(&output, cli.json, full),
        Err(e) => {
            error!("{e:#}");
            Err(e)
        }
    }
}
