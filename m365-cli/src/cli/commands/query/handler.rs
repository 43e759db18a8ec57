//! Query command handler

use anyhow::{Context, Result};
use colored::*;
use csv::Writer;
use serde_json::Value;
use std::fs;
use std::io::{BufWriter, Write};
use std::time::Instant;

use super::{DisplayStyle, OutputFormat, QueryCommands};
use m365::api::annotations::with_formatted_values;
use m365::{Config, M365Client, Pages, QueryRequest};

/// Run a paginated query and write the records.
///
/// `verbose` comes from the global `-v` flag; `--style verbose` has the same effect.
pub async fn handle_query_command(args: QueryCommands, config: &Config, verbose: bool) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }
    let verbose = verbose || matches!(args.style, DisplayStyle::Verbose);

    if args.query.is_some() && args.file.is_some() {
        anyhow::bail!("Cannot specify both --query and --file");
    }
    if args.max_pages == Some(0) {
        anyhow::bail!("--max-pages must be at least 1");
    }

    let query_text = if let Some(query) = &args.query {
        query.clone()
    } else if let Some(file_path) = &args.file {
        if !file_path.exists() {
            anyhow::bail!("Query file does not exist: {}", file_path.display());
        }

        let content = fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read query file: {}", file_path.display()))?;
        if verbose {
            eprintln!("Reading query from: {}", file_path.display().to_string().cyan());
        }
        content.trim().to_string()
    } else {
        String::new()
    };

    let credentials = config.credentials()?;
    let chunksize = args.chunksize.unwrap_or_else(|| config.chunksize());
    if chunksize == 0 {
        anyhow::bail!("Chunk size must be at least 1");
    }
    let request = QueryRequest::new(args.api_url.clone())
        .query(query_text)
        .chunksize(chunksize);

    if verbose {
        eprintln!(
            "Querying: {}",
            request.initial_url(&credentials.base_url).dimmed()
        );
        eprintln!("Page size: {}", chunksize);
    }

    let start = Instant::now();
    let client = M365Client::with_authority_host(config.authority_host());
    let mut pages = client
        .query(&credentials, &request)
        .await
        .context("Failed to authenticate")?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut collected = Vec::new();
    let fetched = fetch_pages(&mut pages, &args, &mut *writer, &mut collected, verbose).await;

    // Records from pages received before a failure are still written
    let written = if args.format == OutputFormat::Ndjson {
        Ok(())
    } else {
        format_output(&Value::Array(collected), &args.format)
            .and_then(|output| writeln!(writer, "{}", output).map_err(Into::into))
    };
    writer.flush().context("Failed to flush output")?;
    fetched?;
    written?;

    if verbose {
        let total = pages
            .total_count()
            .map(|count| format!(" of {}", count))
            .unwrap_or_default();
        eprintln!(
            "{} {}{} records in {} pages, {:.2}ms",
            "Done:".bright_green().bold(),
            pages.records_fetched(),
            total,
            pages.pages_fetched(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        if let Some(path) = &args.output {
            eprintln!("Results saved to: {}", path.display().to_string().bright_green());
        }
    }

    Ok(())
}

/// Pull pages until the chain ends, the page limit is hit, or a request fails.
///
/// NDJSON records go straight to `writer`; other formats accumulate in `collected`.
async fn fetch_pages(
    pages: &mut Pages,
    args: &QueryCommands,
    writer: &mut dyn Write,
    collected: &mut Vec<Value>,
    verbose: bool,
) -> Result<()> {
    loop {
        if args.max_pages.is_some_and(|max| pages.pages_fetched() >= max) {
            if verbose && !pages.is_done() {
                eprintln!("{}", "Page limit reached, more results available".yellow());
            }
            return Ok(());
        }

        let page = pages
            .next_page()
            .await
            .with_context(|| format!("Failed to fetch page {}", pages.pages_fetched() + 1))?;
        let Some(page) = page else {
            return Ok(());
        };

        let records = page.into_iter().map(|record| {
            if args.formatted {
                with_formatted_values(&record)
            } else {
                record
            }
        });

        if args.format == OutputFormat::Ndjson {
            for record in records {
                writeln!(writer, "{}", serde_json::to_string(&record)?)?;
            }
            writer.flush()?;
        } else {
            collected.extend(records);
        }

        if verbose {
            eprintln!(
                "Fetched page {} ({} records so far)",
                pages.pages_fetched(),
                pages.records_fetched()
            );
        }
    }
}

/// Format collected records according to the specified output format
fn format_output(data: &Value, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).context("Failed to format JSON output"),
        OutputFormat::JsonCompact | OutputFormat::Ndjson => {
            serde_json::to_string(data).context("Failed to format JSON output")
        }
        OutputFormat::Csv => json_to_csv(data),
    }
}

/// Convert an array of records to CSV.
///
/// Columns are the union of record keys in first-seen order, so sparse
/// records (OData omits nulls in some projections) keep their columns.
fn json_to_csv(data: &Value) -> Result<String> {
    let mut wtr = Writer::from_writer(Vec::new());

    match data {
        Value::Array(records) if records.is_empty() => return Ok(String::new()),
        Value::Array(records) => {
            let mut headers: Vec<&str> = Vec::new();
            for record in records {
                if let Value::Object(obj) = record {
                    for key in obj.keys() {
                        if !headers.contains(&key.as_str()) {
                            headers.push(key);
                        }
                    }
                }
            }

            wtr.write_record(&headers)
                .context("Failed to write CSV header")?;

            for (index, record) in records.iter().enumerate() {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| record.get(*h).map(json_value_to_string).unwrap_or_default())
                    .collect();
                wtr.write_record(&row)
                    .with_context(|| format!("Failed to write record {}", index))?;
            }
        }
        _ => {
            wtr.write_record(["value"])
                .context("Failed to write CSV header")?;
            wtr.write_record([json_value_to_string(data)])
                .context("Failed to write value")?;
        }
    }

    let bytes = wtr.into_inner().context("Failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Convert a JSON value to a string representation
fn json_value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
