//! OpenSearch query builders.
//!
//! This module turns a [`SearchIntent`] into a request body in the engine's
//! query DSL. Building is pure and deterministic; parameter problems are
//! reported as `SearchError::ConstructionError` before any request exists.

use serde_json::{json, Map, Value};

use crate::errors::SearchError;
use catalog_search_shared::{
    BoolClauses, Fuzziness, PageWindow, QueryDocument, RangeBounds, SearchIntent,
};

/// Build the request body for a search intent.
///
/// Shapes produced:
/// - `match` with optional `from`/`size` (only when the caller set them)
/// - `multi_match` with fields in caller order (order drives boost precedence)
/// - `bool` with the non-empty clause groups passed through untouched
/// - `range` with the bounds that are set
/// - `fuzzy` with the fuzziness token forwarded as-is
/// - `match_phrase` with `slop`
/// - aggregations wrapped with `size: 0` so no hits are returned
pub fn build_search_query(intent: &SearchIntent) -> Result<QueryDocument, SearchError> {
    let body = match intent {
        SearchIntent::Match { field, query, page } => build_match_query(field, query, page)?,
        SearchIntent::MultiMatch { query, fields } => build_multi_match_query(query, fields)?,
        SearchIntent::Bool(clauses) => build_bool_query(clauses)?,
        SearchIntent::Range { field, bounds } => build_range_query(field, bounds)?,
        SearchIntent::Fuzzy {
            field,
            value,
            fuzziness,
        } => build_fuzzy_query(field, value, fuzziness)?,
        SearchIntent::Phrase {
            field,
            phrase,
            slop,
        } => build_phrase_query(field, phrase, *slop)?,
        SearchIntent::Aggregation { aggregations } => build_aggregation_query(aggregations)?,
    };

    Ok(QueryDocument::new(body))
}

/// `{ field: value }` with a runtime key.
fn field_clause(field: &str, value: Value) -> Value {
    let mut clause = Map::new();
    clause.insert(field.to_string(), value);
    Value::Object(clause)
}

fn require_field(field: &str, kind: &str) -> Result<(), SearchError> {
    if field.trim().is_empty() {
        return Err(SearchError::construction(format!(
            "{} query requires a field name",
            kind
        )));
    }
    Ok(())
}

/// Build a single-field match query.
fn build_match_query(field: &str, query: &str, page: &PageWindow) -> Result<Value, SearchError> {
    require_field(field, "match")?;

    let mut body = json!({
        "query": {
            "match": field_clause(field, json!(query))
        }
    });

    // Engine defaults apply unless the caller asked for a window
    if let Some(from) = page.from {
        body["from"] = json!(from);
    }
    if let Some(size) = page.size {
        body["size"] = json!(size);
    }

    Ok(body)
}

/// Build a multi-field match query.
fn build_multi_match_query(query: &str, fields: &[String]) -> Result<Value, SearchError> {
    if fields.is_empty() {
        return Err(SearchError::construction(
            "multi_match query requires at least one field",
        ));
    }
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(SearchError::construction(
            "multi_match query fields must not be blank",
        ));
    }

    Ok(json!({
        "query": {
            "multi_match": {
                "query": query,
                "fields": fields
            }
        }
    }))
}

/// Build a boolean query from caller-supplied clauses.
///
/// Clause contents are not inspected beyond rejecting `null`.
fn build_bool_query(clauses: &BoolClauses) -> Result<Value, SearchError> {
    let mut bool_body = Map::new();

    for (occur, group) in clauses.groups() {
        if group.iter().any(Value::is_null) {
            return Err(SearchError::construction(format!(
                "bool query has a null clause in '{}'",
                occur
            )));
        }
        bool_body.insert(occur.to_string(), Value::Array(group.to_vec()));
    }

    match &clauses.minimum_should_match {
        Some(Value::Null) => {
            return Err(SearchError::construction(
                "bool query minimum_should_match must not be null",
            ))
        }
        Some(value) => {
            bool_body.insert("minimum_should_match".to_string(), value.clone());
        }
        None => {}
    }

    Ok(json!({
        "query": {
            "bool": bool_body
        }
    }))
}

/// Build a range filter on a numeric or date field.
fn build_range_query(field: &str, bounds: &RangeBounds) -> Result<Value, SearchError> {
    require_field(field, "range")?;
    if !bounds.has_bound() {
        return Err(SearchError::construction(format!(
            "range query on '{}' requires at least one of gte, lte, gt, lt",
            field
        )));
    }

    let mut range = Map::new();
    let named = [
        ("gte", &bounds.gte),
        ("lte", &bounds.lte),
        ("gt", &bounds.gt),
        ("lt", &bounds.lt),
    ];
    for (name, bound) in named {
        if let Some(value) = bound {
            range.insert(name.to_string(), value.clone());
        }
    }
    if let Some(format) = &bounds.format {
        range.insert("format".to_string(), json!(format));
    }

    Ok(json!({
        "query": {
            "range": field_clause(field, Value::Object(range))
        }
    }))
}

/// Build a fuzzy term query.
///
/// Typo tolerance (Levenshtein distance) is computed by the engine; the
/// fuzziness setting is only forwarded.
fn build_fuzzy_query(field: &str, value: &str, fuzziness: &Fuzziness) -> Result<Value, SearchError> {
    require_field(field, "fuzzy")?;

    Ok(json!({
        "query": {
            "fuzzy": field_clause(field, json!({
                "value": value,
                "fuzziness": fuzziness.to_value()
            }))
        }
    }))
}

/// Build a phrase query. `slop = 0` requires the exact adjacent order.
fn build_phrase_query(field: &str, phrase: &str, slop: u32) -> Result<Value, SearchError> {
    require_field(field, "phrase")?;

    Ok(json!({
        "query": {
            "match_phrase": field_clause(field, json!({
                "query": phrase,
                "slop": slop
            }))
        }
    }))
}

/// Build an aggregation-only request.
///
/// `size: 0` is always set so the engine returns metrics without hits.
fn build_aggregation_query(aggregations: &Map<String, Value>) -> Result<Value, SearchError> {
    if aggregations.is_empty() {
        return Err(SearchError::construction(
            "aggregation query requires at least one aggregation",
        ));
    }
    if let Some((name, _)) = aggregations.iter().find(|(_, spec)| !spec.is_object()) {
        return Err(SearchError::construction(format!(
            "aggregation '{}' must be an object",
            name
        )));
    }

    Ok(json!({
        "size": 0,
        "aggs": aggregations
    }))
}
