//! Command-line interface

pub mod commands;

use clap::{Args, Parser, Subcommand};
use m365::Config;
use std::path::PathBuf;

use commands::query::QueryCommands;
use commands::token::TokenCommands;

#[derive(Parser, Debug)]
#[command(name = "m365-cli", version, about = "Query Microsoft 365 OData APIs with client credentials")]
pub struct Cli {
    /// Path to a TOML config file (defaults to <config dir>/m365-cli/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page of an OData collection
    Query(QueryCommands),
    /// Acquire an access token and show its expiry
    Token(TokenCommands),
}

/// Connection overrides; the client secret is only read from config or environment
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Resource base URL, e.g. https://org.crm4.dynamics.com
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Azure AD tenant id
    #[arg(long, global = true)]
    pub tenant_id: Option<String>,

    /// Azure AD application (client) id
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Identity provider host
    #[arg(long, global = true)]
    pub authority_host: Option<String>,
}

impl ConnectionArgs {
    /// Flags take precedence over file and environment settings
    pub fn apply(&self, config: &mut Config) {
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(tenant_id) = &self.tenant_id {
            config.tenant_id = Some(tenant_id.clone());
        }
        if let Some(client_id) = &self.client_id {
            config.client_id = Some(client_id.clone());
        }
        if let Some(authority_host) = &self.authority_host {
            config.authority_host = Some(authority_host.clone());
        }
    }
}
