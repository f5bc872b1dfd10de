//! Search error types.
//!
//! This module defines the errors surfaced by query construction, request
//! execution and response handling. Each variant is a distinct class so
//! callers can choose a policy (retry, report, ignore) without inspecting
//! message text.

use thiserror::Error;

use super::ExtractionError;

/// Errors that can occur while talking to the search engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The intent parameters were rejected before any request was sent.
    #[error("Construction error: {0}")]
    ConstructionError(String),

    /// The engine could not be reached, or its reply could not be read.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The engine accepted the request but reported a failure.
    #[error("Engine error (status {status}): {message}")]
    EngineError { status: u16, message: String },

    /// A point lookup or delete targeted a document that does not exist.
    #[error("Document not found: index={index}, id={id}")]
    NotFound { index: String, id: String },

    /// The engine replied with success but the body had an unexpected shape.
    #[error("Malformed response: {0}")]
    MalformedResponseError(#[from] ExtractionError),

    /// The caller cancelled the request or its deadline passed.
    #[error("Request cancelled")]
    Cancelled,

    /// Client configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl SearchError {
    /// Create a construction error.
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::ConstructionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create an engine error.
    pub fn engine(status: u16, msg: impl Into<String>) -> Self {
        Self::EngineError {
            status,
            message: msg.into(),
        }
    }

    /// Create a not-found error for a document id.
    pub fn not_found(index: &str, id: &str) -> Self {
        Self::NotFound {
            index: index.to_string(),
            id: id.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Whether a caller may reasonably retry the same request.
    ///
    /// Only transport failures qualify; construction and response-shape
    /// errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportError(_))
    }

    /// Whether this is the expected "document does not exist" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Engine status code, when the engine produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::EngineError { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}
