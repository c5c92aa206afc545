//! Progress tracking for export runs
//!
//! Draws an optional spinner on stderr with the number of records exported
//! and the current throughput. Standard output is never touched.

use std::time::Instant;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress tracker for export runs
pub struct ProgressTracker {
    /// Start time of the operation
    start_time: Instant,
    /// Spinner (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `limit` - Record limit if one is set, shown as the total
    /// * `enable_bar` - Whether to draw anything
    pub fn new(limit: Option<u64>, enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| match limit {
            Some(n) => {
                let bar = ProgressBar::with_draw_target(Some(n), ProgressDrawTarget::stderr());
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            }
            None => {
                let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("{spinner:.green} {pos} records {msg}")
                {
                    bar.set_style(style);
                }
                bar
            }
        });

        Self {
            start_time: Instant::now(),
            bar,
        }
    }

    /// A tracker that draws nothing
    pub fn hidden() -> Self {
        Self::new(None, false)
    }

    /// Update progress with the total number of records processed so far
    pub fn update(&mut self, count: u64) {
        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({:.0} records/sec)", speed));
            }
        }
    }

    /// Finish and clear the spinner
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
