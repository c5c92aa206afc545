//! Export coordinator for orchestrating export runs
//!
//! Brings together the streaming query, the row formatter and the output
//! writer. The coordinator owns the row limit and guarantees that buffered
//! output is flushed on every exit path, including errors.

use std::time::Instant;

use tokio::io::AsyncWrite;
use tracing::{debug, info, warn};

use crate::error::Result;

use super::formatter::RowFormatter;
use super::progress::ProgressTracker;
use super::streaming::StreamingQuery;
use super::writer::StreamWriter;

/// Result of an export run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of records emitted
    pub records: u64,
    /// Number of lines written, header included
    pub lines: u64,
    /// Number of pages received
    pub pages: u64,
    /// Time taken for the run
    pub elapsed_ms: u64,
    /// Whether the run stopped at the record limit
    pub limit_reached: bool,
}

/// Coordinator for export runs
pub struct ExportCoordinator<W: AsyncWrite + Unpin + Send> {
    /// Streaming query for fetching records
    query: Box<dyn StreamingQuery>,
    /// Record to line conversion
    formatter: RowFormatter,
    /// Output sink
    writer: StreamWriter<W>,
    /// Progress tracker for user feedback
    tracker: ProgressTracker,
    /// Maximum number of records to emit
    limit: Option<u64>,
    /// Whether to write the header line first
    header: bool,
}

impl<W: AsyncWrite + Unpin + Send> ExportCoordinator<W> {
    /// Create a new export coordinator
    pub fn new(
        query: Box<dyn StreamingQuery>,
        formatter: RowFormatter,
        writer: StreamWriter<W>,
    ) -> Self {
        Self {
            query,
            formatter,
            writer,
            tracker: ProgressTracker::hidden(),
            limit: None,
            header: false,
        }
    }

    /// Stop after `limit` records; `None` exports everything
    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    /// Write the header line before any data
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    pub fn with_progress(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Execute the export run
    ///
    /// Output written before a failure is flushed before the error is
    /// returned.
    ///
    /// # Returns
    /// * `Result<ExportSummary>` - Run statistics or the first error
    pub async fn execute(&mut self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        info!("Starting export");

        let mut summary = ExportSummary::default();
        let outcome = self.pump(&mut summary).await;

        let flushed = self.writer.flush().await;
        self.tracker.finish();

        if let Err(e) = self.query.close().await {
            warn!("Failed to close query: {}", e);
        }

        outcome?;
        flushed?;

        summary.lines = self.writer.lines_written();
        summary.elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Export completed: {} records, {} lines, {} pages, {} ms",
            summary.records, summary.lines, summary.pages, summary.elapsed_ms
        );
        Ok(summary)
    }

    /// Consume the coordinator and return the output sink
    pub fn into_output(self) -> W {
        self.writer.into_inner()
    }

    async fn pump(&mut self, summary: &mut ExportSummary) -> Result<()> {
        if self.header {
            let line = self.formatter.header_line();
            self.writer.write_line(&line).await?;
        }

        if self.limit_reached(summary.records) {
            summary.limit_reached = true;
            return Ok(());
        }

        while let Some(hits) = self.query.next_batch().await? {
            summary.pages += 1;
            debug!("Received page #{} with {} records", summary.pages, hits.len());

            for hit in &hits {
                for line in self.formatter.format(hit)? {
                    self.writer.write_line(&line).await?;
                }
                summary.records += 1;
                self.tracker.update(summary.records);

                if self.limit_reached(summary.records) {
                    info!("Record limit of {} reached", summary.records);
                    summary.limit_reached = true;
                    return Ok(());
                }
            }

            if summary.pages % 10 == 0 {
                info!(
                    "Progress: {} records exported ({} pages)",
                    summary.records, summary.pages
                );
            }
        }

        debug!("No more records available");
        Ok(())
    }

    fn limit_reached(&self, records: u64) -> bool {
        self.limit.is_some_and(|limit| records >= limit)
    }
}
