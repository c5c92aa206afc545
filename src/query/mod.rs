//! Query document construction
//!
//! Builds the JSON body of the initial scan request: either a match-all query
//! or a caller-supplied document, optionally annotated with the list of
//! fields the backend should return.

use serde_json::{Map, Value, json};

use crate::config::{ExportConfig, OutputMode};
use crate::error::{ConfigError, Result};

/// Builder for the initial query document
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    body: Map<String, Value>,
}

impl QueryBuilder {
    /// Start from a query that matches every document
    pub fn match_all() -> Self {
        let mut body = Map::new();
        body.insert("query".to_string(), json!({ "match_all": {} }));
        Self { body }
    }

    /// Start from a caller-supplied JSON document
    ///
    /// The document must be a JSON object.
    pub fn from_json(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(body)) => Ok(Self { body }),
            Ok(other) => Err(ConfigError::InvalidQuery(format!(
                "expected a JSON object, got {other}"
            ))
            .into()),
            Err(e) => Err(ConfigError::InvalidQuery(e.to_string()).into()),
        }
    }

    /// Restrict the returned fields to `fields`
    pub fn with_fields(mut self, fields: &[String]) -> Self {
        self.body.insert("fields".to_string(), json!(fields));
        self
    }

    /// Build the query for an export run
    ///
    /// Raw mode streams whole records, so no field list is attached.
    pub fn for_export(config: &ExportConfig) -> Result<Value> {
        let builder = match config.query.as_deref() {
            Some(text) => Self::from_json(text)?,
            None => Self::match_all(),
        };
        let builder = match config.mode {
            OutputMode::Raw => builder,
            OutputMode::Columns | OutputMode::SingleValue => builder.with_fields(&config.fields),
        };
        Ok(builder.build())
    }

    pub fn build(self) -> Value {
        Value::Object(self.body)
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::match_all()
    }
}
