//! Request and response types shared by the transport and its callers.

use serde_json::Value;

use crate::errors::SearchError;

/// How a single-document write treats an existing document with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the document or replace it entirely.
    Index,
    /// Create the document; fail with a conflict if the id already exists.
    Create,
}

/// An engine reply: HTTP status plus the decoded body.
///
/// Bodies that are not JSON are kept as a string value and empty bodies as
/// `Value::Null`, so error replies can still be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded response body.
    pub body: Value,
}

impl RawResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Best-effort error description from the engine's error envelope.
    ///
    /// Prefers `error.type: error.reason`, then a plain string `error`, then
    /// the raw body.
    pub fn error_message(&self) -> String {
        match self.body.get("error") {
            Some(Value::Object(error)) => {
                let kind = error.get("type").and_then(Value::as_str);
                let reason = error.get("reason").and_then(Value::as_str);
                match (kind, reason) {
                    (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
                    (None, Some(reason)) => reason.to_string(),
                    (Some(kind), None) => kind.to_string(),
                    (None, None) => Value::Object(error.clone()).to_string(),
                }
            }
            Some(Value::String(error)) => error.clone(),
            _ => match &self.body {
                Value::Null => format!("empty response with status {}", self.status),
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        }
    }

    /// Turn a non-2xx reply into `SearchError::EngineError`.
    pub fn error_for_status(self) -> Result<Self, SearchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SearchError::engine(self.status, self.error_message()))
        }
    }
}
