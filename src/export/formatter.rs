//! Row layout for export output
//!
//! A [`RowFormatter`] turns one record into zero or more output lines:
//! - **Raw**: the whole record as one compact JSON line
//! - **SingleValue**: one line per value of the only requested field
//! - **Columns**: field values joined by the separator, columns joined by the
//!   delimiter

use crate::config::{ExportConfig, OutputMode, RenderOptions};
use crate::error::{FormatError, Result};
use crate::model::Hit;

use super::resolver::FieldResolver;

/// Formats records into output lines
#[derive(Debug, Clone)]
pub struct RowFormatter {
    mode: OutputMode,
    fields: Vec<String>,
    resolver: FieldResolver,
}

impl RowFormatter {
    /// Create a formatter
    ///
    /// The mode/field combination is expected to be validated already
    /// (see [`ExportConfig::validate`]).
    pub fn new(mode: OutputMode, fields: Vec<String>, options: RenderOptions) -> Self {
        Self {
            mode,
            fields,
            resolver: FieldResolver::new(options),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.mode, config.fields.clone(), config.render.clone())
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Field names joined by the delimiter
    pub fn header_line(&self) -> String {
        self.fields.join(&self.resolver.options().delimiter)
    }

    /// Format one record
    ///
    /// # Returns
    /// * `Result<Vec<String>>` - Output lines, without terminators
    pub fn format(&self, hit: &Hit) -> Result<Vec<String>> {
        match self.mode {
            OutputMode::Raw => {
                let line = serde_json::to_string(hit)
                    .map_err(|e| FormatError::Serialize(e.to_string()))?;
                Ok(vec![line])
            }
            OutputMode::SingleValue => {
                let mut lines = Vec::new();
                for field in &self.fields {
                    lines.extend(self.resolver.resolve(hit, field)?);
                }
                Ok(lines)
            }
            OutputMode::Columns => {
                let options = self.resolver.options();
                let columns = self
                    .fields
                    .iter()
                    .map(|field| {
                        self.resolver
                            .resolve(hit, field)
                            .map(|values| values.join(&options.separator))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(vec![columns.join(&options.delimiter)])
            }
        }
    }
}
