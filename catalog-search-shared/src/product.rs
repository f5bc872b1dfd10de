//! Product document stored in the catalog index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bulk::IndexableDocument;

/// A product as stored in the search engine.
///
/// Identifier, brand and categories are indexed as keywords (exact-match
/// filterable); name and description are analyzed text. Fields the engine
/// returns beyond these are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Document identifier, also used as the engine `_id`.
    pub id: String,
    /// Display name, e.g. "Dell Gaming Laptop".
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Price in the catalog currency.
    pub price: f64,
    /// Ordered category labels.
    pub categories: Vec<String>,
    /// Manufacturer brand.
    pub brand: String,
    /// Whether the product is currently in stock.
    pub in_stock: bool,
    /// Average rating between 1 and 5.
    pub rating: f64,
    /// Creation timestamp. Older documents may not carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl IndexableDocument for Product {
    fn document_id(&self) -> &str {
        &self.id
    }
}
