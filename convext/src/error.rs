//! Serializer errors

use convext_core::{DateTimeError, DomainError};
use thiserror::Error;

/// Error codes for failures raised by the engine itself
pub mod codes {
    pub const UNKNOWN_CONVERTER: &str = "UNKNOWN_CONVERTER";
    pub const SHAPE_MISMATCH: &str = "SHAPE_MISMATCH";
    pub const INVALID_DATE: &str = "INVALID_DATE";
    pub const MISSING_TOKEN: &str = "MISSING_TOKEN";
    pub const JSON_ERROR: &str = "JSON_ERROR";
}

#[derive(Debug, Error)]
pub enum SerializeError {
    /// A converter rejected the slot at `path`
    #[error("{source} Path '{path}'.")]
    Convert { path: String, source: DomainError },

    #[error("Unknown converter '{name}'{}", suggestion_hint(.suggestions))]
    UnknownConverter { name: String, suggestions: Vec<String> },

    #[error("Expected {expected} at '{path}', found {found}.")]
    ShapeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Invalid date at '{path}': {source}")]
    InvalidDate { path: String, source: DateTimeError },

    #[error("Converter '{converter}' did not write a single value token at '{path}'.")]
    MissingToken { path: String, converter: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        ".".to_string()
    } else {
        format!(". Similar: {}.", suggestions.join(", "))
    }
}

impl SerializeError {
    pub fn code(&self) -> &'static str {
        match self {
            SerializeError::Convert { source, .. } => source.code(),
            SerializeError::UnknownConverter { .. } => codes::UNKNOWN_CONVERTER,
            SerializeError::ShapeMismatch { .. } => codes::SHAPE_MISMATCH,
            SerializeError::InvalidDate { .. } => codes::INVALID_DATE,
            SerializeError::MissingToken { .. } => codes::MISSING_TOKEN,
            SerializeError::Json(_) => codes::JSON_ERROR,
        }
    }

    /// Underlying converter error, if a converter raised this one
    pub fn domain_error(&self) -> Option<&DomainError> {
        match self {
            SerializeError::Convert { source, .. } => Some(source),
            _ => None,
        }
    }
}
