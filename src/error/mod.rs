//! Error handling module for estab.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! [`EstabError`] wraps more specific error kinds:
//! - [`ConfigError`]: invalid flags or config file, detected before any request
//! - [`TransportError`]: failures talking to the search backend
//! - [`FormatError`]: records that cannot be rendered as text
//!
//! Errors are never handled below the top level; they propagate with `?` up to
//! `main`, which prints the message and exits non-zero.
//!
//! # Example
//!
//! ```rust
//! use estab::error::{ConfigError, EstabError, Result};
//!
//! fn check_fields(fields: &[String]) -> Result<()> {
//!     if fields.is_empty() {
//!         return Err(ConfigError::MissingField("fields".to_string()).into());
//!     }
//!     Ok(())
//! }
//!
//! let err = check_fields(&[]).unwrap_err();
//! assert!(matches!(err, EstabError::Config(_)));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, EstabError, FormatError, Result, TransportError};
