//! Config command - manage configuration.

use std::path::Path;

use anyhow::Result;
use clap::{Args, Subcommand};
use playreports_store::{Config, default_config_dir, default_resources_dir, default_tokens_dir};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Init { force } => init_config(*force, cli),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    match cli.format {
        OutputFormat::Text => {
            println!("PlayReports Configuration");
            println!("{}", "─".repeat(40));
            println!();
            for (label, value) in describe(&config) {
                println!("{:<21}{value}", format!("{label}:"));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

/// Labeled values of every configuration key, in display order.
fn describe(config: &Config) -> Vec<(&'static str, String)> {
    vec![
        ("Bucket", display_opt(config.bucket.as_deref()).to_string()),
        ("Token backend", format!("{:?}", config.token_backend)),
        ("Namespace", config.namespace.clone()),
        ("Keep reports", config.keep_reports.to_string()),
        ("Force reauth", config.force_reauthorization.to_string()),
        ("Client secret", display_path(config.client_secret_path.as_deref())),
        ("Service key", display_path(config.service_key_path.as_deref())),
        (
            "Service e-mail",
            display_opt(config.service_account_email.as_deref()).to_string(),
        ),
        ("Output dir", display_path(config.output_dir.as_deref())),
        ("Resources dir", display_path(config.resources_dir.as_deref())),
    ]
}

fn display_opt(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}

fn display_path(path: Option<&Path>) -> String {
    path.map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_file = cli.config_path();
    let tokens_dir = default_tokens_dir();
    let resources_dir = default_resources_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Config file:   {}", config_file.display());
            println!("Tokens dir:    {}", tokens_dir.display());
            println!("Resources dir: {}", resources_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_file.display().to_string(),
                "tokens_dir": tokens_dir.display().to_string(),
                "resources_dir": resources_dir.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(force: bool, cli: &Cli) -> Result<()> {
    let path = cli.config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    info!(path = %path.display(), "Configuration initialized");
    println!("Wrote {}", path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
