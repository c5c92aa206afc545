//! estab - Elasticsearch to TSV exporter
//!
//! Streams every document matching a query out of a search cluster with the
//! scan/scroll API and writes the requested fields as delimited text.
//!
//! # Usage
//!
//! ```bash
//! # Export _id and _index of every document in two indices
//! estab --indices "logs-2024 logs-2025" --header
//!
//! # One tag per line
//! estab -1 -f tags --query '{"query": {"term": {"status": "open"}}}'
//! ```

use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use estab::Result;
use estab::cli::CliInterface;
use estab::client::SearchClient;
use estab::export::{self, StreamWriter};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    let export_config = cli.export_config()?;
    let client = SearchClient::from_config(cli.config())?;

    let mut coordinator = export::build_export(
        &export_config,
        client,
        StreamWriter::stdout(),
        cli.args().progress,
    )?;
    let summary = coordinator.execute().await?;

    debug!(
        "Exported {} records ({} lines, {} pages) in {} ms",
        summary.records, summary.lines, summary.pages, summary.elapsed_ms
    );
    Ok(())
}

/// Initialize logging on stderr
///
/// `RUST_LOG` takes precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
