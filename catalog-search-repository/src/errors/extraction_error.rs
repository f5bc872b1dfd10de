//! Response extraction errors.

use thiserror::Error;

/// Ways a success response can fail to match the expected envelope.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The response body is not a JSON object.
    #[error("response body is not an object")]
    NotAnObject,

    /// `hits.total` is neither a non-negative integer nor `{value, relation}`.
    #[error("invalid hits.total: {0}")]
    InvalidTotal(String),

    /// `hits.hits` is present but not an array.
    #[error("hits.hits is not an array")]
    InvalidHits,

    /// A hit carries no `_source` document.
    #[error("hit {position} has no _source document")]
    MissingSource { position: usize },

    /// A hit's `_source` does not decode into the expected item shape.
    #[error("hit {position} could not be decoded: {reason}")]
    InvalidDocument { position: usize, reason: String },
}
