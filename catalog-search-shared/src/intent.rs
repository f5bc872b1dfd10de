//! Search intents.
//!
//! An intent describes what kind of search to run, independent of the
//! engine's query syntax. Intents are immutable once constructed; turning
//! one into a request body (and validating its parameters) is the job of the
//! query builder in the repository crate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Optional result window for searches that return hits.
///
/// Unset values are left out of the request so the engine applies its own
/// defaults (`from = 0`, `size = 10`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// Offset of the first hit.
    pub from: Option<u64>,
    /// Maximum number of hits to return.
    pub size: Option<u64>,
}

impl PageWindow {
    /// A window with both offset and size set.
    pub fn new(from: u64, size: u64) -> Self {
        Self {
            from: Some(from),
            size: Some(size),
        }
    }

    /// Set the page size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Bounds for a range filter on a numeric or date field.
///
/// Bound values are passed through as-is, so dates may use any format the
/// engine accepts (optionally declared through `format`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    /// Date format for string bounds, e.g. `yyyy-MM-dd`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl RangeBounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Whether at least one of `gte`, `lte`, `gt`, `lt` is set.
    pub fn has_bound(&self) -> bool {
        self.gte.is_some() || self.lte.is_some() || self.gt.is_some() || self.lt.is_some()
    }
}

/// Edit-distance tolerance for fuzzy matching.
///
/// The value is forwarded to the engine untouched; nothing here computes
/// edit distances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fuzziness {
    /// The engine's length-dependent `AUTO` setting.
    Auto,
    /// A fixed maximum number of edits.
    Edits(u32),
    /// Any other engine token, e.g. `AUTO:3,6`.
    Custom(String),
}

impl Fuzziness {
    /// The request-body representation of this setting.
    pub fn to_value(&self) -> Value {
        match self {
            Fuzziness::Auto => Value::String("AUTO".to_string()),
            Fuzziness::Edits(edits) => Value::from(*edits),
            Fuzziness::Custom(token) => Value::String(token.clone()),
        }
    }
}

impl From<u32> for Fuzziness {
    fn from(edits: u32) -> Self {
        Fuzziness::Edits(edits)
    }
}

/// Pre-built sub-clauses for a boolean query.
///
/// Clauses are opaque query fragments: the engine is the authority on their
/// grammar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolClauses {
    pub must: Vec<Value>,
    pub should: Vec<Value>,
    pub must_not: Vec<Value>,
    pub filter: Vec<Value>,
    pub minimum_should_match: Option<Value>,
}

impl BoolClauses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, clause: Value) -> Self {
        self.must.push(clause);
        self
    }

    pub fn should(mut self, clause: Value) -> Self {
        self.should.push(clause);
        self
    }

    pub fn must_not(mut self, clause: Value) -> Self {
        self.must_not.push(clause);
        self
    }

    pub fn filter(mut self, clause: Value) -> Self {
        self.filter.push(clause);
        self
    }

    pub fn minimum_should_match(mut self, value: impl Into<Value>) -> Self {
        self.minimum_should_match = Some(value.into());
        self
    }

    /// Iterate over the non-empty clause groups with their engine keys.
    pub fn groups(&self) -> impl Iterator<Item = (&'static str, &[Value])> {
        [
            ("must", self.must.as_slice()),
            ("should", self.should.as_slice()),
            ("must_not", self.must_not.as_slice()),
            ("filter", self.filter.as_slice()),
        ]
        .into_iter()
        .filter(|(_, clauses)| !clauses.is_empty())
    }
}

/// A domain-level description of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchIntent {
    /// Full-text match of one query string against one field.
    Match {
        field: String,
        query: String,
        page: PageWindow,
    },
    /// One query string fanned across an ordered list of fields.
    MultiMatch { query: String, fields: Vec<String> },
    /// Boolean composition of caller-built clauses.
    Bool(BoolClauses),
    /// Numeric or date range filter on one field.
    Range { field: String, bounds: RangeBounds },
    /// Typo-tolerant term match.
    Fuzzy {
        field: String,
        value: String,
        fuzziness: Fuzziness,
    },
    /// Phrase match allowing `slop` term displacements.
    Phrase {
        field: String,
        phrase: String,
        slop: u32,
    },
    /// Metrics only: named aggregation specs, no hits.
    Aggregation { aggregations: Map<String, Value> },
}

impl SearchIntent {
    /// Match intent with the engine's default page window.
    pub fn matching(field: impl Into<String>, query: impl Into<String>) -> Self {
        SearchIntent::Match {
            field: field.into(),
            query: query.into(),
            page: PageWindow::default(),
        }
    }

    /// Match intent with an explicit page window.
    pub fn matching_page(
        field: impl Into<String>,
        query: impl Into<String>,
        page: PageWindow,
    ) -> Self {
        SearchIntent::Match {
            field: field.into(),
            query: query.into(),
            page,
        }
    }

    pub fn multi_match<I, S>(query: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchIntent::MultiMatch {
            query: query.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(field: impl Into<String>, bounds: RangeBounds) -> Self {
        SearchIntent::Range {
            field: field.into(),
            bounds,
        }
    }

    pub fn fuzzy(
        field: impl Into<String>,
        value: impl Into<String>,
        fuzziness: impl Into<Fuzziness>,
    ) -> Self {
        SearchIntent::Fuzzy {
            field: field.into(),
            value: value.into(),
            fuzziness: fuzziness.into(),
        }
    }

    pub fn phrase(field: impl Into<String>, phrase: impl Into<String>, slop: u32) -> Self {
        SearchIntent::Phrase {
            field: field.into(),
            phrase: phrase.into(),
            slop,
        }
    }

    pub fn aggregation(aggregations: Map<String, Value>) -> Self {
        SearchIntent::Aggregation { aggregations }
    }

    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchIntent::Match { .. } => "match",
            SearchIntent::MultiMatch { .. } => "multi_match",
            SearchIntent::Bool(_) => "bool",
            SearchIntent::Range { .. } => "range",
            SearchIntent::Fuzzy { .. } => "fuzzy",
            SearchIntent::Phrase { .. } => "phrase",
            SearchIntent::Aggregation { .. } => "aggregation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_bounds_builder() {
        let bounds = RangeBounds::new().gte(1000).lte(2000);

        assert!(bounds.has_bound());
        assert_eq!(
            serde_json::to_value(&bounds).unwrap(),
            json!({"gte": 1000, "lte": 2000})
        );
        assert!(!RangeBounds::new().format("yyyy").has_bound());
    }

    #[test]
    fn test_fuzziness_tokens() {
        assert_eq!(Fuzziness::Auto.to_value(), json!("AUTO"));
        assert_eq!(Fuzziness::from(1).to_value(), json!(1));
        assert_eq!(
            Fuzziness::Custom("AUTO:3,6".to_string()).to_value(),
            json!("AUTO:3,6")
        );
    }

    #[test]
    fn test_bool_groups_skip_empty() {
        let clauses = BoolClauses::new()
            .must(json!({"match": {"brand": "Apple"}}))
            .filter(json!({"range": {"price": {"gte": 1000}}}));

        let keys: Vec<&str> = clauses.groups().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["must", "filter"]);
    }

    #[test]
    fn test_multi_match_preserves_field_order() {
        let intent = SearchIntent::multi_match("gaming laptop", ["name^2", "description"]);

        match intent {
            SearchIntent::MultiMatch { fields, .. } => {
                assert_eq!(fields, vec!["name^2", "description"]);
            }
            other => panic!("unexpected intent: {:?}", other),
        }
    }
}
