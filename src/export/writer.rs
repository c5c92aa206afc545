//! Buffered line output
//!
//! [`StreamWriter`] appends newline-terminated lines to any async byte sink.
//! Each line and its terminator go into the buffer in a single write, so a
//! consumer never sees a line without its newline.

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};
use tracing::debug;

use crate::error::Result;

/// Buffer size for standard output
const STDOUT_BUFFER: usize = 64 * 1024;

/// Buffered writer for output lines
pub struct StreamWriter<W: AsyncWrite + Unpin> {
    /// Buffered sink
    writer: BufWriter<W>,
    /// Number of lines written
    lines: u64,
}

impl StreamWriter<Stdout> {
    /// Create a writer over the process standard output
    pub fn stdout() -> Self {
        Self::with_capacity(STDOUT_BUFFER, tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            lines: 0,
        }
    }

    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, inner),
            lines: 0,
        }
    }

    /// Append one line; the terminator is added here
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.writer.write_all(&buf).await?;
        self.lines += 1;
        Ok(())
    }

    /// Push everything buffered to the underlying sink
    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await?;
        debug!("Flushed output ({} lines)", self.lines);
        Ok(())
    }

    /// Number of lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Unwrap the sink; unflushed data is lost
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
