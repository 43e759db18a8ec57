//! `token` command: verify credentials by acquiring an access token

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use colored::*;
use m365::{Config, M365Client};

#[derive(Args, Debug)]
pub struct TokenCommands {
    /// Print the access token itself
    #[arg(long)]
    pub show: bool,
}

pub async fn handle_token_command(args: TokenCommands, config: &Config) -> Result<()> {
    let credentials = config.credentials()?;
    let client = M365Client::with_authority_host(config.authority_host());

    let token = client
        .acquire_token(&credentials)
        .await
        .context("Failed to acquire access token")?;

    println!(
        "{} token acquired for {}",
        "OK".bright_green().bold(),
        credentials.base_url.cyan()
    );
    match token.expires_at {
        Some(expires_at) => println!(
            "Expires: {}",
            expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z")
        ),
        None => println!("Expires: {}", "unknown".dimmed()),
    }
    if args.show {
        println!("{}", token.access_token);
    }

    Ok(())
}
