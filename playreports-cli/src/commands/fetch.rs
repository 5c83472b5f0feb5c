//! Fetch command - download the reports of a month.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use playreports_core::ReportMonth;
use playreports_fetch::{CredentialSources, DirResources, RunContext, RunOptions};
use playreports_google::{GcsConnector, GoogleIdentity};
use playreports_store::{Config, default_resources_dir};
use tracing::{debug, info};

use crate::output::{JsonFormatter, ReportSummary, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the fetch command.
#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Reports bucket id (overrides the config file).
    #[arg(long, short)]
    pub bucket: Option<String>,

    /// Any day of the month to fetch: YYYY-MM-DD, YYYY-MM or YYYYMM.
    /// Defaults to the current month.
    #[arg(long, short)]
    pub date: Option<ReportMonth>,

    /// Clear the stored login before authorizing.
    #[arg(long)]
    pub force_auth: bool,

    /// OAuth2 client secret JSON file.
    #[arg(long)]
    pub client_secret: Option<PathBuf>,

    /// Service account PKCS#12 key file.
    #[arg(long, requires = "service_email")]
    pub service_key: Option<PathBuf>,

    /// Service account e-mail.
    #[arg(long, requires = "service_key")]
    pub service_email: Option<String>,

    /// Copy the reports out of the temp dir under their original names.
    #[arg(long, short)]
    pub keep: bool,

    /// Destination for kept reports.
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
}

impl FetchArgs {
    /// Layers the command line over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(bucket) = &self.bucket {
            config.bucket = Some(bucket.clone());
        }
        if let Some(path) = &self.client_secret {
            config.client_secret_path = Some(path.clone());
        }
        if let Some(path) = &self.service_key {
            config.service_key_path = Some(path.clone());
        }
        if let Some(email) = &self.service_email {
            config.service_account_email = Some(email.clone());
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
        config.force_reauthorization |= self.force_auth;
        config.keep_reports |= self.keep;
    }

    fn options(&self, config: &Config) -> Result<RunOptions> {
        let bucket = config.resolve_bucket()?;
        let month = self.date.unwrap_or_else(ReportMonth::current);

        let mut options = RunOptions::new(bucket, month);
        options.force_reauthorization = config.force_reauthorization;
        options.keep_reports = config.keep_reports;
        if let Some(dir) = &config.output_dir {
            options.output_dir.clone_from(dir);
        }
        Ok(options)
    }
}

/// Builds the pipeline for a configuration.
fn build_context(config: &Config) -> Result<RunContext> {
    let resources_dir = config
        .resources_dir
        .clone()
        .unwrap_or_else(default_resources_dir);
    debug!(path = %resources_dir.display(), "Bundled credentials dir");

    let sources = CredentialSources {
        service_key_path: config.service_key_path.clone(),
        service_account_email: config.service_account_email.clone(),
        client_secret_path: config.client_secret_path.clone(),
    };

    let context = RunContext::builder()
        .identity(Arc::new(GoogleIdentity::new()))
        .tokens(config.open_token_store())
        .connector(Arc::new(GcsConnector::new()))
        .resources(Arc::new(DirResources::new(resources_dir)))
        .sources(sources)
        .build()?;
    Ok(context)
}

/// Runs the fetch command.
pub async fn run(args: &FetchArgs, cli: &Cli) -> Result<()> {
    let mut config = cli.load_config()?;
    args.apply(&mut config);
    config.warn_inconsistencies();

    let options = args.options(&config)?;
    let context = build_context(&config)?;

    info!(bucket = %options.bucket, month = %options.month, "Fetching reports");
    let outcome = context
        .run(&options)
        .await
        .with_context(|| format!("fetching reports for {}", options.month))?;

    let summary = ReportSummary::from_outcome(&options.bucket, outcome)
        .context("keeping downloaded reports")?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_summary(&summary));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&summary)?);
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
