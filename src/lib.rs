//! estab library
//!
//! Exports documents from an Elasticsearch cluster as delimited text using the
//! scan/scroll API. The binary is a thin wrapper around this library.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `client`: HTTP transport for the scan/scroll protocol
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Streaming export pipeline
//! - `model`: Search response records
//! - `query`: Search body construction
//!
//! # Example
//!
//! ```no_run
//! use estab::client::SearchClient;
//! use estab::config::{Config, ExportConfig, OutputMode, RenderOptions};
//! use estab::export::{self, StreamWriter};
//!
//! #[tokio::main]
//! async fn main() -> estab::Result<()> {
//!     let config = Config::default();
//!     let export_config = ExportConfig {
//!         indices: vec!["logs".to_string()],
//!         fields: vec!["_id".to_string(), "host".to_string()],
//!         query: None,
//!         mode: OutputMode::Columns,
//!         header: true,
//!         limit: Some(100),
//!         scroll_timeout: config.scroll.timeout.clone(),
//!         page_size: config.scroll.size,
//!         render: RenderOptions::from(&config.output),
//!     };
//!
//!     let client = SearchClient::from_config(&config)?;
//!     let mut coordinator =
//!         export::build_export(&export_config, client, StreamWriter::stdout(), false)?;
//!     coordinator.execute().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod query;

// Re-export commonly used types
pub use client::{ScrollTransport, SearchClient};
pub use config::{Config, ExportConfig, OutputMode};
pub use error::{EstabError, Result};
pub use export::{ExportCoordinator, ExportSummary};
pub use model::Hit;
pub use query::QueryBuilder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
