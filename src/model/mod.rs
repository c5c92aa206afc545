//! Search records and field values
//!
//! A [`Hit`] is one search result as returned by the backend. Its field map
//! holds arbitrary JSON; [`FieldValue`] classifies a value into the shapes the
//! exporter knows how to flatten, with an explicit `Unsupported` arm for the
//! rest.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: String,

    /// Mapping type; newer backends omit it
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    #[serde(rename = "_id", default)]
    pub id: String,

    /// Relevance score; `Some(None)` is an explicit `null` (scan queries)
    #[serde(
        rename = "_score",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<Option<f64>>,

    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,

    /// Any other keys the backend sent, kept for raw passthrough
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hit {
    /// Look up a field and classify its value
    pub fn field(&self, name: &str) -> FieldValue<'_> {
        FieldValue::classify(self.fields.get(name))
    }

    /// Relevance score, if the backend sent a number
    pub fn score(&self) -> Option<f64> {
        self.score.flatten()
    }
}

/// Wraps a present key in `Some`, so an explicit `null` survives as `Some(None)`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Shape of a field value, as far as flattening is concerned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Field missing or explicitly null
    Null,
    String(&'a str),
    Number(f64),
    Boolean(bool),
    /// Multi-valued field; elements are classified one by one
    Array(&'a [Value]),
    /// Objects and anything else that has no flat text form
    Unsupported(&'a Value),
}

impl<'a> FieldValue<'a> {
    pub fn classify(value: Option<&'a Value>) -> Self {
        let Some(value) = value else {
            return FieldValue::Null;
        };
        match value {
            Value::Null => FieldValue::Null,
            Value::String(s) => FieldValue::String(s),
            Value::Number(n) => n
                .as_f64()
                .map_or(FieldValue::Unsupported(value), FieldValue::Number),
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Array(items) => FieldValue::Array(items),
            Value::Object(_) => FieldValue::Unsupported(value),
        }
    }
}

/// Element of a multi-valued field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    String(&'a str),
    Number(f64),
    Boolean(bool),
    /// `null`, nested arrays and objects
    Unsupported(&'a Value),
}

impl<'a> Scalar<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Scalar::String(s),
            Value::Number(n) => n.as_f64().map_or(Scalar::Unsupported(value), Scalar::Number),
            Value::Bool(b) => Scalar::Boolean(*b),
            Value::Null | Value::Array(_) | Value::Object(_) => Scalar::Unsupported(value),
        }
    }
}

/// Response to a scan or scroll request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,

    #[serde(default)]
    pub hits: HitsEnvelope,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<Hit>,
}
