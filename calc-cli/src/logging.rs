//! Log output for the `calc` binary.
//!
//! Records go to stderr so results printed on stdout stay pipeable, and to
//! an append-only file when one is configured. `RUST_LOG` takes precedence
//! over the configured level.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{self, FmtContext};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

/// Where log records go and how verbose they are.
#[derive(Debug, Clone, Copy)]
pub struct LogTargets<'a> {
    /// A bare level (`warn`, `debug`, ...) or a full filter directive.
    pub level: &'a str,
    pub console: bool,
    pub file: Option<&'a Path>,
}

/// `HH:MM:SS.mmm LEVEL target: fields`, local time, colored on a terminal.
struct CompactLocal;

impl<S, N> FormatEvent<S, N> for CompactLocal
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        if writer.has_ansi_escapes() {
            let color = match *meta.level() {
                Level::ERROR => "31",
                Level::WARN => "33",
                Level::INFO => "32",
                Level::DEBUG => "34",
                Level::TRACE => "35",
            };
            write!(
                writer,
                "\x1b[2m{timestamp}\x1b[0m \x1b[1;{color}m{:>5}\x1b[0m \x1b[2m{}:\x1b[0m ",
                meta.level(),
                meta.target()
            )?;
        } else {
            write!(writer, "{timestamp} {:>5} {}: ", meta.level(), meta.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter from `RUST_LOG` when set and valid, otherwise from `level`.
pub fn make_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Fails for an invalid level, a log file that cannot be opened, or a
/// second call.
pub fn init_logging(targets: &LogTargets<'_>) -> Result<()> {
    let filter = make_filter(targets.level)?;

    let console = targets.console.then(|| {
        fmt::layer()
            .event_format(CompactLocal)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
    });

    let file = match targets.file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Some(
                fmt::layer()
                    .event_format(CompactLocal)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("logging already initialized")
}
