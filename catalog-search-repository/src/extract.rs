//! Response normalization.
//!
//! Turns the engine's search envelope into a [`SearchResult`]:
//!
//! ```text
//! { "hits": { "total": 42 | {"value": 42, "relation": "eq"},
//!             "hits": [ { "_source": {...} }, ... ] },
//!   "aggregations": { ... } }
//! ```
//!
//! A hit that cannot be decoded fails the whole extraction; partial pages
//! are never returned.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ExtractionError;
use catalog_search_shared::SearchResult;

/// Extract the normalized result from a successful search response.
pub fn extract_search_result<T: DeserializeOwned>(
    raw: &Value,
) -> Result<SearchResult<T>, ExtractionError> {
    let envelope = raw.as_object().ok_or(ExtractionError::NotAnObject)?;

    let hits = envelope.get("hits");
    let total = match hits.and_then(|h| h.get("total")) {
        Some(total) => parse_total(total)?,
        None => 0,
    };

    let items = match hits.and_then(|h| h.get("hits")) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(position, hit)| {
                let source = hit
                    .get("_source")
                    .filter(|source| !source.is_null())
                    .ok_or(ExtractionError::MissingSource { position })?;
                decode_source(source, position)
            })
            .collect::<Result<Vec<T>, _>>()?,
        Some(_) => return Err(ExtractionError::InvalidHits),
    };

    let aggregations = envelope
        .get("aggregations")
        .filter(|aggs| !aggs.is_null())
        .cloned();

    Ok(SearchResult {
        total,
        items,
        aggregations,
    })
}

/// Decode one stored document into the caller's item type.
pub(crate) fn decode_source<T: DeserializeOwned>(
    source: &Value,
    position: usize,
) -> Result<T, ExtractionError> {
    T::deserialize(source).map_err(|e| ExtractionError::InvalidDocument {
        position,
        reason: e.to_string(),
    })
}

/// `hits.total` is a bare count on older engines and `{value, relation}` on
/// newer ones.
fn parse_total(total: &Value) -> Result<u64, ExtractionError> {
    match total {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ExtractionError::InvalidTotal(total.to_string())),
        Value::Object(obj) => obj
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| ExtractionError::InvalidTotal(total.to_string())),
        other => Err(ExtractionError::InvalidTotal(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_shared::Product;
    use serde::Deserialize;
    use serde_json::json;

    fn product_source(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": "A Gaming Laptop featuring Wireless and RGB Lighting. Perfect for daily use.",
            "price": 1299.99,
            "categories": ["Laptops", "Gaming"],
            "brand": "Razer",
            "in_stock": true,
            "rating": 4.5,
            "created_at": "2024-03-01T12:00:00Z"
        })
    }

    #[test]
    fn test_extract_total_object_form() {
        let raw = json!({
            "took": 3,
            "hits": {
                "total": {"value": 42, "relation": "eq"},
                "hits": [
                    {"_id": "1", "_score": 1.2, "_source": product_source("1", "Razer Gaming Laptop")},
                    {"_id": "2", "_score": 0.8, "_source": product_source("2", "Dell Basic Laptop")}
                ]
            }
        });

        let result: SearchResult<Product> = extract_search_result(&raw).unwrap();

        assert_eq!(result.total, 42);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].name, "Razer Gaming Laptop");
        assert_eq!(result.items[1].id, "2");
        assert!(result.aggregations.is_none());
    }

    #[test]
    fn test_extract_total_bare_integer() {
        let raw = json!({"hits": {"total": 7, "hits": []}});

        let result: SearchResult<Value> = extract_search_result(&raw).unwrap();
        assert_eq!(result.total, 7);
        assert!(result.is_empty());
    }

    #[test]
    fn test_extract_aggregations_without_hits() {
        let raw = json!({
            "hits": {"total": {"value": 1000, "relation": "eq"}, "hits": []},
            "aggregations": {
                "avg_price": {"value": 1549.5},
                "brands": {"buckets": [{"key": "Apple", "doc_count": 70}]}
            }
        });

        let result: SearchResult<Product> = extract_search_result(&raw).unwrap();

        assert_eq!(result.total, 1000);
        assert!(result.items.is_empty());
        assert_eq!(result.aggregation("avg_price").unwrap()["value"], 1549.5);
        assert_eq!(
            result.aggregation("brands").unwrap()["buckets"][0]["key"],
            "Apple"
        );
    }

    #[test]
    fn test_extract_missing_hits_section() {
        let result: SearchResult<Value> = extract_search_result(&json!({"took": 1})).unwrap();

        assert_eq!(result, SearchResult::empty());
    }

    #[test]
    fn test_extract_fails_on_undecodable_hit() {
        let mut broken = product_source("2", "Dell Basic Laptop");
        broken.as_object_mut().unwrap().remove("price");
        let raw = json!({
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "hits": [
                    {"_source": product_source("1", "Razer Gaming Laptop")},
                    {"_source": broken}
                ]
            }
        });

        let err = extract_search_result::<Product>(&raw).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidDocument { position: 1, .. }));
    }

    #[test]
    fn test_extract_fails_on_missing_source() {
        let raw = json!({"hits": {"total": 1, "hits": [{"_id": "1"}]}});

        let err = extract_search_result::<Value>(&raw).unwrap_err();
        assert_eq!(err, ExtractionError::MissingSource { position: 0 });
    }

    #[test]
    fn test_extract_rejects_bad_envelopes() {
        assert_eq!(
            extract_search_result::<Value>(&json!([1, 2])).unwrap_err(),
            ExtractionError::NotAnObject
        );
        assert_eq!(
            extract_search_result::<Value>(&json!({"hits": {"hits": {}}})).unwrap_err(),
            ExtractionError::InvalidHits
        );
        assert!(matches!(
            extract_search_result::<Value>(&json!({"hits": {"total": "many"}})).unwrap_err(),
            ExtractionError::InvalidTotal(_)
        ));
        assert!(matches!(
            extract_search_result::<Value>(&json!({"hits": {"total": -1}})).unwrap_err(),
            ExtractionError::InvalidTotal(_)
        ));
    }

    #[test]
    fn test_extract_into_custom_shape() {
        #[derive(Debug, Deserialize)]
        struct NameOnly {
            name: String,
        }

        let raw = json!({
            "hits": {"total": 1, "hits": [{"_source": product_source("1", "HP Smart Monitor")}]}
        });

        let result: SearchResult<NameOnly> = extract_search_result(&raw).unwrap();
        assert_eq!(result.items[0].name, "HP Smart Monitor");
    }
}
