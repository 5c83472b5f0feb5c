// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `PlayReports` CLI - pull monthly earnings and sales reports.
//!
//! # Examples
//!
//! ```bash
//! # Reports of the current month, printed as temp file paths
//! playreports
//!
//! # A specific month from a specific bucket, copied into ./reports
//! playreports fetch --bucket pubsite_prod_rev_0123 --date 2021-03 --keep --output-dir reports
//!
//! # Use a service account instead of the interactive login
//! playreports fetch --service-key key.p12 --service-email svc@proj.iam.gserviceaccount.com
//!
//! # Forget the stored login
//! playreports logout
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use playreports_core::ReportsError;
use playreports_store::{Config, StoreError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, fetch, logout};

// ============================================================================
// CLI Definition
// ============================================================================

/// `PlayReports` CLI - monthly earnings and sales reports.
#[derive(Parser)]
#[command(name = "playreports")]
#[command(about = "Download monthly earnings and sales reports from a Cloud Storage bucket")]
#[command(long_about = r#"
PlayReports downloads the monthly earnings report and the sales reports of a
month (and of the month after it) from a Cloud Storage reports bucket.

Credentials are picked in this order:
  1. --service-key + --service-email (or service_key_path + service_account_email)
  2. --client-secret (or client_secret_path)
  3. bundled service_key.p12 + service_email in the resources dir
  4. bundled client_secret.json in the resources dir

Examples:
  playreports                                  # current month
  playreports fetch --date 2021-03 --keep      # copy March 2021 into .
  playreports fetch --format json              # machine-readable output
  playreports logout                           # forget the stored login
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'fetch' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to the platform config dir).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Loads the configuration file selected on the command line.
    pub fn load_config(&self) -> Result<Config, StoreError> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }

    /// Path of the configuration file in use.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the reports of a month (default if no command specified).
    #[command(visible_alias = "f")]
    Fetch(fetch::FetchArgs),

    /// Forget the stored interactive login.
    Logout,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Missing bucket or credentials.
    Configuration = 2,
    /// Credentials present but unusable.
    Credential = 3,
    /// No earnings report for the requested month.
    NotFound = 4,
    /// Malformed report archive.
    Format = 5,
}

impl ExitCode {
    /// Exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(e) = cause.downcast_ref::<ReportsError>() {
                return match e {
                    ReportsError::Configuration(_) => Self::Configuration,
                    ReportsError::Credential(_) => Self::Credential,
                    ReportsError::NotFound(_) => Self::NotFound,
                    ReportsError::Format(_) => Self::Format,
                    _ => Self::Error,
                };
            }
            if let Some(StoreError::Config(_)) = cause.downcast_ref::<StoreError>() {
                return Self::Configuration;
            }
        }
        Self::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("playreports=debug,info")
    } else {
        EnvFilter::new("playreports=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Fetch(args)) => fetch::run(args, &cli).await,
        Some(Commands::Logout) => logout::run(&cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => fetch::run(&fetch::FetchArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
