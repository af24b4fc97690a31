// sheetsync - Stripe → sheet batch sync

mod exit_codes;
mod logging;
mod slack;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use sheetsync_client::StripeClient;
use sheetsync_config::{ConfigError, SyncConfig, ENV_SECRET_KEY};
use sheetsync_engine::{
    run_pass, LogNotifier, Notifier, Pass, PassReport, SyncContext, SyncError, SHEET_DATE_FORMAT,
};
use sheetsync_io::CsvWorkbook;

use exit_codes::{
    sync_exit_code, EXIT_CONFIG_INVALID, EXIT_CONFIG_IO, EXIT_ERROR, EXIT_FETCH_NOT_AUTH,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "sheetsync")]
#[command(about = "Append new Stripe records to sheet storage, newest first")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/sheetsync/config.toml)
    #[arg(long, global = true, env = "SHEETSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Only log warnings and errors; no per-pass summary
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync payouts with one row per balance transaction
    #[command(after_help = "\
Examples:
  sheetsync payouts
  sheetsync payouts --from 2026-01-01 --to 2026-01-31")]
    Payouts {
        /// First arrival date (YYYY-MM-DD, inclusive). Disables watermark filtering.
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Last arrival date (YYYY-MM-DD, inclusive)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Sync charges with customer name and product label
    Charges,

    /// Sync paid invoices
    Invoices,

    /// Sync payment intents
    Payments,

    /// Sync checkout sessions
    Sessions,

    /// Run every watermark-driven pass in order
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let passes = match cli.command {
        Commands::Payouts {
            from: Some(from),
            to: Some(to),
        } => {
            let (from, to) = parse_date_range(&from, &to)?;
            vec![Pass::PayoutsInRange { from, to }]
        }
        Commands::Payouts { .. } => vec![Pass::Payouts],
        Commands::Charges => vec![Pass::Charges],
        Commands::Invoices => vec![Pass::Invoices],
        Commands::Payments => vec![Pass::Payments],
        Commands::Sessions => vec![Pass::Sessions],
        Commands::All => Pass::ALL.to_vec(),
    };

    let config = SyncConfig::load(cli.config.as_deref()).map_err(CliError::config)?;

    let client = StripeClient::new(&config.stripe)
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    let store = CsvWorkbook::from_config(&config);
    let notifier = notifier_for(&config);

    let ctx = SyncContext {
        config: &config,
        source: &client,
        store: &store,
        notifier: notifier.as_ref(),
    };

    // Every pass is attempted; the first failure decides the exit code.
    let mut first_error: Option<SyncError> = None;
    for pass in passes {
        match run_pass(&ctx, pass) {
            Ok(report) => {
                if !cli.quiet {
                    print_report(&report);
                }
            }
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        None => Ok(()),
        Some(err) => Err(CliError::sync(err)),
    }
}

fn notifier_for(config: &SyncConfig) -> Box<dyn Notifier> {
    match config.notify.webhook_url.as_deref() {
        Some(url) => match slack::SlackNotifier::new(url) {
            Ok(n) => Box::new(n),
            Err(e) => {
                tracing::warn!(error = %e, "Slack notifier unavailable; logging failures only");
                Box::new(LogNotifier)
            }
        },
        None => Box::new(LogNotifier),
    }
}

fn print_report(report: &PassReport) {
    let watermark = report
        .watermark
        .map(|w| w.format(SHEET_DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());
    eprintln!(
        "{}: {} new rows → {} ({} fetched, watermark {})",
        report.pass, report.rows_written, report.destination, report.candidates, watermark,
    );
}

/// Parse and validate `--from` / `--to`. Both ends are inclusive, so `--to`
/// covers its whole day.
fn parse_date_range(from: &str, to: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), CliError> {
    let from_date = NaiveDate::parse_from_str(from, "%Y-%m-%d")
        .map_err(|e| CliError::args(format!("invalid --from date {:?}: {}", from, e)))?;
    let to_date = NaiveDate::parse_from_str(to, "%Y-%m-%d")
        .map_err(|e| CliError::args(format!("invalid --to date {:?}: {}", to, e)))?;

    if from_date > to_date {
        return Err(CliError::args(format!(
            "--from ({}) must not be after --to ({})",
            from_date, to_date,
        )));
    }

    let start = from_date.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    let end = to_date.and_hms_opt(23, 59, 59).map(|d| d.and_utc());
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(CliError::args("date out of range")),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(err: ConfigError) -> Self {
        let code = match err {
            ConfigError::Io { .. } => EXIT_CONFIG_IO,
            ConfigError::Parse(_) | ConfigError::Validation(_) => EXIT_CONFIG_INVALID,
        };
        Self::new(code, err.to_string())
    }

    /// Create error from sync error with proper exit code.
    pub fn sync(err: SyncError) -> Self {
        let code = sync_exit_code(&err);
        let hint = match code {
            EXIT_FETCH_NOT_AUTH => Some(format!("export {ENV_SECRET_KEY}=sk_live_...")),
            exit_codes::EXIT_FETCH_AUTH => {
                Some("the Stripe key was rejected; check it is a live secret or restricted key".to_string())
            }
            exit_codes::EXIT_STORAGE_MISSING => {
                Some("create the sheet CSV with a header row in the storage dir".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
