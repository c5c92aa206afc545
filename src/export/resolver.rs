//! Field flattening
//!
//! Turns one requested field of one record into an ordered list of text values.
//! Reserved metadata names (`_id`, `_index`, `_type`, `_score`) are read from the
//! record itself; every other name is looked up in the record's field map.

use crate::config::RenderOptions;
use crate::error::{FormatError, Result};
use crate::model::{FieldValue, Hit, Scalar};

/// Decimal places used for relevance scores
pub const SCORE_PRECISION: usize = 6;

/// Metadata fields that bypass the field map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedField {
    Id,
    Index,
    Type,
    Score,
}

impl ReservedField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "_id" => Some(ReservedField::Id),
            "_index" => Some(ReservedField::Index),
            "_type" => Some(ReservedField::Type),
            "_score" => Some(ReservedField::Score),
            _ => None,
        }
    }

    fn render(self, hit: &Hit) -> String {
        match self {
            ReservedField::Id => hit.id.clone(),
            ReservedField::Index => hit.index.clone(),
            ReservedField::Type => hit.doc_type.clone().unwrap_or_default(),
            ReservedField::Score => format_fixed(hit.score().unwrap_or(0.0), SCORE_PRECISION),
        }
    }
}

/// Resolves field names to rendered values
#[derive(Debug, Clone)]
pub struct FieldResolver {
    options: RenderOptions,
}

impl FieldResolver {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Resolve `field` on `hit`
    ///
    /// Returns zero, one or many values. A missing or null field yields the
    /// null sentinel once. Objects, nested arrays and `null` array elements
    /// are rejected with [`FormatError::UnsupportedFieldType`].
    pub fn resolve(&self, hit: &Hit, field: &str) -> Result<Vec<String>> {
        if let Some(reserved) = ReservedField::parse(field) {
            return Ok(vec![reserved.render(hit)]);
        }

        match hit.field(field) {
            FieldValue::Null => Ok(vec![self.options.null_value.clone()]),
            FieldValue::Array(items) => items
                .iter()
                .map(|item| self.render_scalar(field, Scalar::classify(item)))
                .collect(),
            FieldValue::String(s) => Ok(vec![self.render_scalar(field, Scalar::String(s))?]),
            FieldValue::Number(n) => Ok(vec![self.render_scalar(field, Scalar::Number(n))?]),
            FieldValue::Boolean(b) => Ok(vec![self.render_scalar(field, Scalar::Boolean(b))?]),
            FieldValue::Unsupported(value) => Err(unsupported(field, value)),
        }
    }

    fn render_scalar(&self, field: &str, scalar: Scalar<'_>) -> Result<String> {
        match scalar {
            Scalar::String("") if self.options.zero_as_null => Ok(self.options.null_value.clone()),
            Scalar::String(s) => Ok(s.to_string()),
            Scalar::Number(n) => Ok(format_fixed(n, self.options.precision)),
            Scalar::Boolean(b) => Ok(b.to_string()),
            Scalar::Unsupported(value) => Err(unsupported(field, value)),
        }
    }
}

fn unsupported(field: &str, value: &serde_json::Value) -> crate::error::EstabError {
    FormatError::UnsupportedFieldType {
        field: field.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Render `value` in fixed-point notation with exactly `precision` decimals
pub fn format_fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}
