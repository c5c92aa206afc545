use std::{fmt, io};

/// Crate-wide `Result` type using [`EstabError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, EstabError>;

/// Top-level error type for estab operations.
#[derive(Debug)]
pub enum EstabError {
    /// Configuration errors.
    Config(ConfigError),

    /// Search backend transport errors.
    Transport(TransportError),

    /// Record rendering errors.
    Format(FormatError),

    /// I/O errors while writing output.
    Io(io::Error),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Two options that cannot be used together.
    Conflict { first: String, second: String },

    /// Single-value mode was requested with more than one field.
    SingleValueFields(Vec<String>),

    /// The custom query is not a JSON object.
    InvalidQuery(String),
}

/// Transport-specific errors.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    Request(String),

    /// The backend answered with a non-success status.
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    Decode(String),

    /// The backend URL could not be built.
    InvalidUrl(String),
}

/// Rendering-specific errors.
#[derive(Debug)]
pub enum FormatError {
    /// A field value has a shape that cannot be flattened to text.
    UnsupportedFieldType { field: String, value: String },

    /// A record could not be serialized for raw output.
    Serialize(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for EstabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstabError::Config(e) => write!(f, "Configuration error: {e}"),
            EstabError::Transport(e) => write!(f, "Transport error: {e}"),
            EstabError::Format(e) => write!(f, "{e}"),
            EstabError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Conflict { first, second } => {
                write!(f, "{first} and {second} cannot be used together")
            }
            ConfigError::SingleValueFields(fields) => write!(
                f,
                "single-value mode works only with a single column, {} given: {}",
                fields.len(),
                fields.join(" ")
            ),
            ConfigError::InvalidQuery(msg) => write!(f, "Invalid query: {msg}"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(msg) => write!(f, "Request failed: {msg}"),
            TransportError::Status { status, body } => {
                write!(f, "Backend returned status {status}: {body}")
            }
            TransportError::Decode(msg) => write!(f, "Malformed response: {msg}"),
            TransportError::InvalidUrl(msg) => write!(f, "Invalid backend URL: {msg}"),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnsupportedFieldType { field, value } => {
                write!(f, "Unknown field type in response for '{field}': {value}")
            }
            FormatError::Serialize(msg) => write!(f, "Failed to serialize record: {msg}"),
        }
    }
}

impl std::error::Error for EstabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstabError::Io(e) => Some(e),
            _ => None,
        }
    }
}
impl std::error::Error for ConfigError {}
impl std::error::Error for TransportError {}
impl std::error::Error for FormatError {}

/* ========================= Conversions to EstabError ========================= */

impl From<io::Error> for EstabError {
    fn from(err: io::Error) -> Self {
        EstabError::Io(err)
    }
}

impl From<ConfigError> for EstabError {
    fn from(err: ConfigError) -> Self {
        EstabError::Config(err)
    }
}

impl From<TransportError> for EstabError {
    fn from(err: TransportError) -> Self {
        EstabError::Transport(err)
    }
}

impl From<FormatError> for EstabError {
    fn from(err: FormatError) -> Self {
        EstabError::Format(err)
    }
}
