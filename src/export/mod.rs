//! Export pipeline for streaming search results to delimited text
//!
//! The pipeline is built from four components:
//!
//! 1. **StreamingQuery**: pulls records page by page; [`ScrollSession`] implements
//!    it over the scan/scroll protocol
//! 2. **RowFormatter**: flattens each record into output lines, using the
//!    [`FieldResolver`] for individual fields
//! 3. **StreamWriter**: buffered, newline-terminated output
//! 4. **ProgressTracker**: optional stderr feedback
//!
//! These components are orchestrated by the **ExportCoordinator**, which owns
//! the row limit and the final flush.
//!
//! # Example
//!
//! ```no_run
//! use estab::client::{ScanRequest, SearchClient};
//! use estab::config::{Config, OutputMode, RenderOptions};
//! use estab::export::{ExportCoordinator, RowFormatter, ScrollSession, StreamWriter};
//! use serde_json::json;
//!
//! # async fn example() -> estab::Result<()> {
//! let client = SearchClient::from_config(&Config::default())?;
//! let request = ScanRequest {
//!     query: json!({ "query": { "match_all": {} }, "fields": ["_id"] }),
//!     indices: vec!["logs".to_string()],
//!     timeout: "10m".to_string(),
//!     size: 1000,
//! };
//! let session = ScrollSession::new(client, request);
//! let formatter = RowFormatter::new(
//!     OutputMode::Columns,
//!     vec!["_id".to_string()],
//!     RenderOptions::default(),
//! );
//!
//! let mut coordinator =
//!     ExportCoordinator::new(Box::new(session), formatter, StreamWriter::stdout());
//! let summary = coordinator.execute().await?;
//! eprintln!("{} records", summary.records);
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod formatter;
pub mod progress;
pub mod resolver;
pub mod streaming;
pub mod writer;

pub use coordinator::{ExportCoordinator, ExportSummary};
pub use formatter::RowFormatter;
pub use progress::ProgressTracker;
pub use resolver::FieldResolver;
pub use streaming::{ScrollSession, SessionState, StreamingQuery};
pub use writer::StreamWriter;

use tokio::io::AsyncWrite;

use crate::client::{ScanRequest, ScrollTransport};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::query::QueryBuilder;

/// Build a coordinator for `config` over `transport`, writing to `writer`
///
/// The configuration is validated before anything else, so an invalid
/// combination of options never reaches the network.
pub fn build_export<T, W>(
    config: &ExportConfig,
    transport: T,
    writer: StreamWriter<W>,
    show_progress: bool,
) -> Result<ExportCoordinator<W>>
where
    T: ScrollTransport + 'static,
    W: AsyncWrite + Unpin + Send,
{
    config.validate()?;

    let request = ScanRequest {
        query: QueryBuilder::for_export(config)?,
        indices: config.indices.clone(),
        timeout: config.scroll_timeout.clone(),
        size: config.page_size,
    };

    let session = ScrollSession::new(transport, request);
    let coordinator = ExportCoordinator::new(
        Box::new(session),
        RowFormatter::from_config(config),
        writer,
    )
    .with_limit(config.limit)
    .with_header(config.writes_header())
    .with_progress(ProgressTracker::new(config.limit, show_progress));

    Ok(coordinator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScrollPage;
    use crate::config::{OutputMode, RenderOptions};
    use crate::error::{ConfigError, EstabError, TransportError};
    use crate::model::SearchResponse;
    use serde_json::json;
    use streaming::tests::{MockTransport, hit, response};

    fn export_config(mode: OutputMode, fields: &[&str], limit: Option<u64>) -> ExportConfig {
        ExportConfig {
            indices: vec!["idx".to_string()],
            fields: fields.iter().map(|f| f.to_string()).collect(),
            query: None,
            mode,
            header: true,
            limit,
            scroll_timeout: "1m".to_string(),
            page_size: 2,
            render: RenderOptions {
                null_value: "NA".to_string(),
                ..RenderOptions::default()
            },
        }
    }

    fn page(ids: &[&str]) -> Result<ScrollPage> {
        Ok(ScrollPage::Page(response(Some("c"), ids)))
    }

    fn with_tags(id: &str, tags: serde_json::Value) -> SearchResponse {
        let mut record = hit(id);
        record.fields.insert("tags".to_string(), tags);
        SearchResponse {
            scroll_id: Some("c".to_string()),
            hits: crate::model::HitsEnvelope { hits: vec![record] },
        }
    }

    #[tokio::test]
    async fn test_end_to_end_columns() {
        let transport = MockTransport::new(
            response(Some("c"), &[]),
            vec![page(&["1", "2"]), page(&["3"]), page(&[])],
        );
        let config = export_config(OutputMode::Columns, &["_id", "_index"], None);
        let mut coordinator =
            build_export(&config, transport, StreamWriter::new(Vec::new()), false).unwrap();

        let summary = coordinator.execute().await.unwrap();

        assert_eq!(summary.records, 3);
        assert_eq!(summary.pages, 2);
        assert_eq!(
            String::from_utf8(coordinator.into_output()).unwrap(),
            "_id\t_index\n1\tidx\n2\tidx\n3\tidx\n"
        );
    }

    #[tokio::test]
    async fn test_end_to_end_limit_releases_cursor() {
        let transport = MockTransport::new(
            response(Some("c"), &[]),
            vec![page(&["1", "2"]), page(&["3", "4"]), page(&["5"])],
        );
        let state = transport.state.clone();
        let config = export_config(OutputMode::Columns, &["_id"], Some(2));
        let mut coordinator =
            build_export(&config, transport, StreamWriter::new(Vec::new()), false).unwrap();

        let summary = coordinator.execute().await.unwrap();

        assert_eq!(summary.records, 2);
        let state = state.lock().unwrap();
        assert_eq!(state.scroll_ids.len(), 1);
        assert_eq!(state.cleared, vec!["c"]);
    }

    #[tokio::test]
    async fn test_end_to_end_zero_as_null() {
        let transport = MockTransport::new(
            response(Some("c"), &[]),
            vec![
                Ok(ScrollPage::Page(with_tags("1", json!(["a", "", "b"])))),
                Ok(ScrollPage::End),
            ],
        );
        let mut config = export_config(OutputMode::Columns, &["tags"], None);
        config.header = false;
        config.render.zero_as_null = true;
        let mut coordinator =
            build_export(&config, transport, StreamWriter::new(Vec::new()), false).unwrap();

        coordinator.execute().await.unwrap();

        assert_eq!(String::from_utf8(coordinator.into_output()).unwrap(), "a|NA|b\n");
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_earlier_output() {
        let transport = MockTransport::new(
            response(Some("c"), &[]),
            vec![
                page(&["1"]),
                Err(TransportError::Status {
                    status: 500,
                    body: "boom".to_string(),
                }
                .into()),
            ],
        );
        let config = export_config(OutputMode::Columns, &["_id"], None);
        let mut coordinator =
            build_export(&config, transport, StreamWriter::new(Vec::new()), false).unwrap();

        let err = coordinator.execute().await.unwrap_err();

        assert!(matches!(err, EstabError::Transport(_)));
        assert_eq!(String::from_utf8(coordinator.into_output()).unwrap(), "_id\n1\n");
    }

    #[tokio::test]
    async fn test_invalid_config_never_touches_transport() {
        let transport = MockTransport::new(response(Some("c"), &[]), vec![]);
        let state = transport.state.clone();
        let config = export_config(OutputMode::SingleValue, &["a", "b"], None);

        let result = build_export(&config, transport, StreamWriter::new(Vec::new()), false);

        assert!(matches!(
            result.err(),
            Some(EstabError::Config(ConfigError::SingleValueFields(_)))
        ));
        assert_eq!(state.lock().unwrap().scan_calls, 0);
    }
}
