//! Command-line interface for estab
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with flags
//! - Subcommands (version, shell completion, config display)
//! - Building the immutable [`ExportConfig`] for the export pipeline

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Config, ExportConfig, LogLevel, OutputMode, RenderOptions, limit_from_signed};
use crate::error::Result;

/// Split a space-separated list, dropping empty entries
fn split_list(list: &str) -> Vec<String> {
    list.split_whitespace().map(str::to_string).collect()
}

/// Export search backend fields as tab separated values
#[derive(Parser, Debug)]
#[command(
    name = "estab",
    version,
    about = "Export Elasticsearch fields as tab separated values",
    long_about = "Streams every document matching a query out of Elasticsearch using the
scan/scroll API and prints the requested fields as delimited text, one record per line."
)]
pub struct CliArgs {
    /// Backend host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Backend port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Indices to search, space separated (all when empty)
    #[arg(long, value_name = "INDICES", default_value = "")]
    pub indices: String,

    /// Field or fields to export, space separated
    #[arg(short = 'f', long = "fields", value_name = "FIELDS", default_value = "_id _index")]
    pub fields: String,

    /// Scroll timeout
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Scroll batch size
    #[arg(long, value_name = "N")]
    pub size: Option<u32>,

    /// Value for empty fields
    #[arg(long = "null", value_name = "TEXT")]
    pub null_value: Option<String>,

    /// Separator to use for multiple field values
    #[arg(long, value_name = "TEXT")]
    pub separator: Option<String>,

    /// Column delimiter
    #[arg(long, value_name = "TEXT")]
    pub delimiter: Option<String>,

    /// Maximum number of documents to return (negative for all)
    #[arg(long, value_name = "N", default_value_t = -1, allow_hyphen_values = true)]
    pub limit: i64,

    /// Custom query to run, as a JSON document
    #[arg(long, value_name = "JSON")]
    pub query: Option<String>,

    /// Stream out the raw JSON records
    #[arg(long)]
    pub raw: bool,

    /// Output header row with field names
    #[arg(long)]
    pub header: bool,

    /// One value per line (works only with a single field)
    #[arg(short = '1', long = "single-value")]
    pub single_value: bool,

    /// Treat zero length strings as null values
    #[arg(long = "zero-as-null")]
    pub zero_as_null: bool,

    /// Precision for numeric output
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for estab
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration with flags applied
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Load configuration for already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Build the immutable configuration of the export run
    ///
    /// Mode conflicts and field-count violations are reported here, before
    /// any request is made.
    pub fn export_config(&self) -> Result<ExportConfig> {
        let mode = OutputMode::from_flags(self.args.raw, self.args.single_value)?;

        let export = ExportConfig {
            indices: split_list(&self.args.indices),
            fields: split_list(&self.args.fields),
            query: self.args.query.clone(),
            mode,
            header: self.config.output.header,
            limit: limit_from_signed(self.args.limit),
            scroll_timeout: self.config.scroll.timeout.clone(),
            page_size: self.config.scroll.size,
            render: RenderOptions::from(&self.config.output),
        };
        export.validate()?;
        Ok(export)
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_connection_args(config, args);
        Self::apply_scroll_args(config, args);
        Self::apply_output_args(config, args);
        Self::apply_logging_args(config, args);
    }

    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(host) = &args.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = args.port {
            config.connection.port = port;
        }
    }

    fn apply_scroll_args(config: &mut Config, args: &CliArgs) {
        if let Some(timeout) = &args.timeout {
            config.scroll.timeout = timeout.clone();
        }
        if let Some(size) = args.size {
            config.scroll.size = size;
        }
    }

    fn apply_output_args(config: &mut Config, args: &CliArgs) {
        let output = &mut config.output;
        if let Some(null_value) = &args.null_value {
            output.null_value = null_value.clone();
        }
        if let Some(separator) = &args.separator {
            output.separator = separator.clone();
        }
        if let Some(delimiter) = &args.delimiter {
            output.delimiter = delimiter.clone();
        }
        if let Some(precision) = args.precision {
            output.precision = precision;
        }
        output.zero_as_null |= args.zero_as_null;
        output.header |= args.header;
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                Self::generate_completion(*shell);
                Ok(true)
            }
            Some(Commands::Config { show }) => {
                if *show {
                    self.show_config()?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show_version(&self) {
        println!("estab version {}", env!("CARGO_PKG_VERSION"));
    }

    /// Write a completion script for `shell` to stdout
    fn generate_completion(shell: Shell) {
        let mut command = CliArgs::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self
            .args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path);
        println!("# Configuration file: {}", path.display());
        println!("{}", self.config.to_toml()?);
        Ok(())
    }
}
