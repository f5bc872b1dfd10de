//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the product
//! catalog index.

use serde_json::{json, Value};

/// Get the index settings and mappings for the product index.
///
/// The mapping includes:
/// - **Keyword fields**: `id`, `brand` and `categories` for exact-match filters and terms aggregations
/// - **Text fields**: `name` and `description`, analyzed for full-text queries
/// - **Numeric fields**: `price` and `rating` for range filters and metrics
///
/// A single shard with one replica is enough for demo-sized catalogs.
pub fn product_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "id": {
                    "type": "keyword"
                },
                "name": {
                    "type": "text"
                },
                "description": {
                    "type": "text"
                },
                "price": {
                    "type": "float"
                },
                "categories": {
                    "type": "keyword"
                },
                "brand": {
                    "type": "keyword"
                },
                "in_stock": {
                    "type": "boolean"
                },
                "rating": {
                    "type": "float"
                },
                "created_at": {
                    "type": "date"
                }
            }
        }
    })
}
