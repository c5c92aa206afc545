//! Configuration management for estab
//!
//! This module handles loading and merging configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values
//!
//! The merged result is frozen into an [`ExportConfig`], which is the only
//! configuration the export pipeline ever sees.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure, as stored in the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection configuration
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Scroll pagination configuration
    #[serde(default)]
    pub scroll: ScrollConfig,

    /// Output formatting configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// URL scheme used to reach the backend
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Backend host
    #[serde(default = "default_host")]
    pub host: String,

    /// Backend port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

/// Scroll pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Cursor time-to-live, in the backend's duration syntax (e.g. "10m")
    #[serde(default = "default_scroll_timeout")]
    pub timeout: String,

    /// Number of records requested per page
    #[serde(default = "default_scroll_size")]
    pub size: u32,

    /// `search_type` sent with the initial request; empty disables it
    #[serde(default = "default_search_type")]
    pub search_type: String,
}

/// Output formatting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Text written for missing or null values
    #[serde(default = "default_null_value")]
    pub null_value: String,

    /// Separator between values of a multi-valued field
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Column delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Decimal places for numeric values
    #[serde(default)]
    pub precision: usize,

    /// Treat zero-length strings as null values
    #[serde(default)]
    pub zero_as_null: bool,

    /// Emit a header row with field names
    #[serde(default)]
    pub header: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_scroll_timeout() -> String {
    "10m".to_string()
}

fn default_scroll_size() -> u32 {
    10000
}

fn default_search_type() -> String {
    "scan".to_string()
}

fn default_null_value() -> String {
    "NOT_AVAILABLE".to_string()
}

fn default_separator() -> String {
    "|".to_string()
}

fn default_delimiter() -> String {
    "\t".to_string()
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_host(),
            port: default_port(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            timeout: default_scroll_timeout(),
            size: default_scroll_size(),
            search_type: default_search_type(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            null_value: default_null_value(),
            separator: default_separator(),
            delimiter: default_delimiter(),
            precision: 0,
            zero_as_null: false,
            header: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// When `path` is `None` the default location is tried and a missing
    /// file yields the defaults. An explicitly given path must exist.
    ///
    /// # Arguments
    /// * `path` - Optional path to the configuration file
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".estab")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::MissingField("connection.host".to_string()).into());
        }
        if !matches!(self.connection.scheme.as_str(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "connection.scheme".to_string(),
                value: self.connection.scheme.clone(),
            }
            .into());
        }
        if self.scroll.size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scroll.size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.scroll.timeout.trim().is_empty() {
            return Err(ConfigError::MissingField("scroll.timeout".to_string()).into());
        }
        Ok(())
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connection.connect_timeout)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// How each record is laid out in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Whole record as one JSON line
    Raw,

    /// One line per value of the only requested field
    SingleValue,

    /// One delimited line per record
    Columns,
}

impl OutputMode {
    /// Pick the output mode from the raw and single-value toggles
    pub fn from_flags(raw: bool, single_value: bool) -> Result<Self> {
        match (raw, single_value) {
            (true, true) => Err(ConfigError::Conflict {
                first: "--raw".to_string(),
                second: "--single-value".to_string(),
            }
            .into()),
            (true, false) => Ok(OutputMode::Raw),
            (false, true) => Ok(OutputMode::SingleValue),
            (false, false) => Ok(OutputMode::Columns),
        }
    }
}

/// Options controlling how field values are rendered as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub null_value: String,
    pub separator: String,
    pub delimiter: String,
    pub precision: usize,
    pub zero_as_null: bool,
}

impl From<&OutputConfig> for RenderOptions {
    fn from(output: &OutputConfig) -> Self {
        Self {
            null_value: output.null_value.clone(),
            separator: output.separator.clone(),
            delimiter: output.delimiter.clone(),
            precision: output.precision,
            zero_as_null: output.zero_as_null,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

/// Immutable configuration for one export run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Indices to search; empty means all
    pub indices: Vec<String>,

    /// Requested fields, in output order
    pub fields: Vec<String>,

    /// Custom query document, if any
    pub query: Option<String>,

    /// Output layout
    pub mode: OutputMode,

    /// Emit a header row before data
    pub header: bool,

    /// Maximum number of records to emit; `None` means all
    pub limit: Option<u64>,

    /// Scroll cursor time-to-live
    pub scroll_timeout: String,

    /// Page size requested from the backend
    pub page_size: u32,

    /// Value rendering options
    pub render: RenderOptions,
}

impl ExportConfig {
    /// Check cross-field constraints that the output mode imposes
    pub fn validate(&self) -> Result<()> {
        if self.mode == OutputMode::SingleValue && self.fields.len() != 1 {
            return Err(ConfigError::SingleValueFields(self.fields.clone()).into());
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Whether a header row should be written
    ///
    /// Raw mode never writes one.
    pub fn writes_header(&self) -> bool {
        self.header && self.mode != OutputMode::Raw
    }
}

/// Convert a signed CLI limit into an optional record cap
///
/// Negative values mean "no limit".
pub fn limit_from_signed(limit: i64) -> Option<u64> {
    u64::try_from(limit).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstabError;

    fn export_config(mode: OutputMode, fields: &[&str]) -> ExportConfig {
        ExportConfig {
            indices: Vec::new(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            query: None,
            mode,
            header: false,
            limit: None,
            scroll_timeout: "10m".to_string(),
            page_size: 100,
            render: RenderOptions::default(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.connection.host, "localhost");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.scroll.timeout, "10m");
        assert_eq!(config.scroll.size, 10000);
        assert_eq!(config.output.null_value, "NOT_AVAILABLE");
        assert_eq!(config.output.separator, "|");
        assert_eq!(config.output.delimiter, "\t");
        assert_eq!(config.output.precision, 0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [connection]
            host = "search.internal"

            [output]
            null_value = "NA"
            "#,
        )
        .unwrap();
        assert_eq!(config.connection.host, "search.internal");
        assert_eq!(config.connection.port, 9200);
        assert_eq!(config.output.null_value, "NA");
        assert_eq!(config.output.separator, "|");
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[connection\nhost = 1").unwrap_err();
        assert!(matches!(
            err,
            EstabError::Config(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip_keeps_values() {
        let mut config = Config::default();
        config.output.precision = 3;
        let text = config.to_toml().unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.output.precision, 3);
        assert_eq!(parsed.output.delimiter, "\t");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/estab.toml"))).unwrap_err();
        assert!(matches!(
            err,
            EstabError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let mut config = Config::default();
        config.scroll.size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_mode_from_flags() {
        assert_eq!(OutputMode::from_flags(false, false).unwrap(), OutputMode::Columns);
        assert_eq!(OutputMode::from_flags(true, false).unwrap(), OutputMode::Raw);
        assert_eq!(
            OutputMode::from_flags(false, true).unwrap(),
            OutputMode::SingleValue
        );
        assert!(OutputMode::from_flags(true, true).is_err());
    }

    #[test]
    fn test_single_value_requires_one_field() {
        let config = export_config(OutputMode::SingleValue, &["a", "b"]);
        assert!(matches!(
            config.validate().unwrap_err(),
            EstabError::Config(ConfigError::SingleValueFields(_))
        ));
        assert!(export_config(OutputMode::SingleValue, &["a"]).validate().is_ok());
    }

    #[test]
    fn test_empty_field_list_is_accepted() {
        assert!(export_config(OutputMode::Columns, &[]).validate().is_ok());
        assert!(matches!(
            export_config(OutputMode::SingleValue, &[]).validate().unwrap_err(),
            EstabError::Config(ConfigError::SingleValueFields(_))
        ));
    }

    #[test]
    fn test_raw_mode_ignores_fields_and_header() {
        let mut config = export_config(OutputMode::Raw, &["a", "b", "c"]);
        config.header = true;
        assert!(config.validate().is_ok());
        assert!(!config.writes_header());
    }

    #[test]
    fn test_limit_from_signed() {
        assert_eq!(limit_from_signed(-1), None);
        assert_eq!(limit_from_signed(0), Some(0));
        assert_eq!(limit_from_signed(25), Some(25));
    }
}
