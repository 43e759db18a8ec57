mod cli;

use anyhow::Result;
use clap::Parser;
use m365::Config;

use cli::commands::query::handle_query_command;
use cli::commands::token::handle_token_command;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    cli.connection.apply(&mut config);

    match cli.command {
        Commands::Query(args) => handle_query_command(args, &config, cli.verbose).await,
        Commands::Token(args) => handle_token_command(args, &config).await,
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug for this crate with `-v`
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,m365=debug,m365_cli=debug"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}
