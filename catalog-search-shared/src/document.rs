//! Engine-native query document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request body in the engine's query grammar.
///
/// The tree itself is a `serde_json::Value` (null, bool, number, string,
/// array, object). Object key order is not significant; array order is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryDocument(Value);

impl QueryDocument {
    /// Wrap an already-shaped request body.
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Borrow the underlying tree.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for QueryDocument {
    fn from(body: Value) -> Self {
        Self(body)
    }
}

impl std::ops::Index<&str> for QueryDocument {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.0[key]
    }
}
