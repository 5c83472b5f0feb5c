//! Logout command - forget the stored interactive login.

use anyhow::Result;
use tracing::info;

use crate::{Cli, OutputFormat};

/// Runs the logout command.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let tokens = config.open_token_store();
    tokens.logout().await?;

    info!(namespace = %tokens.namespace(), "Token store cleared");
    match cli.format {
        OutputFormat::Text => println!("Logged out"),
        OutputFormat::Json => println!(r#"{{"loggedOut":true}}"#),
    }
    Ok(())
}
