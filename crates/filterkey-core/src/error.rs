//! Error types for key construction, filter validation and parameter decoding.

use thiserror::Error;

use crate::json_type::JsonType;

/// Codec errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A part passed to a key builder was unusable.
    #[error("invalid key part at argument {index}: {reason}")]
    InvalidKeyPart { index: usize, reason: String },

    /// A key builder was given no parts at all.
    #[error("a key needs at least one part")]
    EmptyKey,

    /// Rejected configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Value-level rejection reported by [`FilterType::validate`](crate::FilterType::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value does not parse as the declared type.
    #[error("{value} is not a valid {json_type} for field '{column}'")]
    InvalidValue {
        value: String,
        json_type: JsonType,
        column: String,
    },

    /// A fixed-arity filter got the wrong number of values.
    #[error("field '{column}' expects {min} to {max} values, got {count}")]
    Cardinality {
        count: usize,
        min: usize,
        max: usize,
        column: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
