//! `query` command arguments

pub mod handler;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

pub use handler::handle_query_command;

#[derive(Args, Debug)]
pub struct QueryCommands {
    /// API path relative to the base URL, e.g. api/data/v9.2/accounts
    pub api_url: String,

    /// Query string appended verbatim, e.g. "?$select=name&$top=10"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Read the query string from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Page size requested from the server
    #[arg(long)]
    pub chunksize: Option<u32>,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Replace raw values with their formatted display values
    #[arg(long)]
    pub formatted: bool,

    /// Write results to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DisplayStyle::Quiet)]
    pub style: DisplayStyle,

    /// Disable colored status output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    Json,
    /// Single-line JSON array
    JsonCompact,
    /// One record per line, written as pages arrive
    Ndjson,
    Csv,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum DisplayStyle {
    Quiet,
    Verbose,
}
