//! Normalized search results.

use serde::Serialize;
use serde_json::Value;

use crate::product::Product;

/// The normalized outcome of one executed search.
///
/// `total` is the engine's hit count for the whole query, which may exceed
/// `items.len()` when results are paginated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T = Product> {
    /// Total matching documents reported by the engine.
    pub total: u64,
    /// Decoded hits in engine order.
    pub items: Vec<T>,
    /// Aggregation section, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

impl<T> SearchResult<T> {
    /// A result with no hits and no aggregations.
    pub fn empty() -> Self {
        Self {
            total: 0,
            items: Vec::new(),
            aggregations: None,
        }
    }

    /// Whether the page contains no hits.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up one named aggregation.
    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.as_ref().and_then(|aggs| aggs.get(name))
    }
}
