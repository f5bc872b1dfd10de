//! Search execution.
//!
//! `SearchExecutor` runs a query document against the configured index and
//! classifies every outcome into a [`SearchError`] variant.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::context::RequestContext;
use crate::errors::SearchError;
use crate::extract::extract_search_result;
use crate::interfaces::SearchTransport;
use crate::opensearch::build_search_query;
use catalog_search_shared::{
    BoolClauses, Fuzziness, PageWindow, Product, QueryDocument, RangeBounds, SearchIntent,
    SearchResult,
};

/// Runs searches against one index.
///
/// The executor holds no mutable state and can be shared across tasks.
#[derive(Clone)]
pub struct SearchExecutor {
    transport: Arc<dyn SearchTransport>,
    index: String,
}

impl SearchExecutor {
    pub fn new(transport: Arc<dyn SearchTransport>, index: impl Into<String>) -> Self {
        Self {
            transport,
            index: index.into(),
        }
    }

    /// Target index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Build the query for `intent` and execute it.
    ///
    /// Construction errors are returned before the transport is touched.
    pub async fn search<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        intent: &SearchIntent,
    ) -> Result<SearchResult<T>, SearchError> {
        let query = build_search_query(intent)?;
        debug!(index = %self.index, kind = intent.kind(), "Built search query");
        self.execute(ctx, &query).await
    }

    /// Execute an already-built query document.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - Normalized hits, total and aggregations
    /// * `Err(SearchError::Cancelled)` - The context ended before the reply
    /// * `Err(SearchError::TransportError)` - The engine could not be reached
    /// * `Err(SearchError::EngineError)` - The engine reported a failure
    /// * `Err(SearchError::MalformedResponseError)` - The reply had an unexpected shape
    #[instrument(skip(self, ctx, query), fields(index = %self.index))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        query: &QueryDocument,
    ) -> Result<SearchResult<T>, SearchError> {
        let response = ctx
            .run(self.transport.search(&self.index, query))
            .await
            .inspect_err(|e| warn!(error = %e, "Search request failed"))?
            .error_for_status()
            .inspect_err(|e| warn!(error = %e, "Search rejected by engine"))?;

        let result = extract_search_result(&response.body)?;
        debug!(
            total = result.total,
            count = result.items.len(),
            "Search completed"
        );
        Ok(result)
    }

    /// Full-text match on one field.
    pub async fn match_search(
        &self,
        ctx: &RequestContext,
        field: &str,
        query: &str,
        page: PageWindow,
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::matching_page(field, query, page))
            .await
    }

    /// One query across several fields, in boost order.
    pub async fn multi_match_search(
        &self,
        ctx: &RequestContext,
        query: &str,
        fields: &[&str],
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::multi_match(query, fields.iter().copied()))
            .await
    }

    pub async fn bool_search(
        &self,
        ctx: &RequestContext,
        clauses: BoolClauses,
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::Bool(clauses)).await
    }

    pub async fn range_search(
        &self,
        ctx: &RequestContext,
        field: &str,
        bounds: RangeBounds,
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::range(field, bounds)).await
    }

    pub async fn fuzzy_search(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: &str,
        fuzziness: Fuzziness,
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::fuzzy(field, value, fuzziness))
            .await
    }

    pub async fn phrase_search(
        &self,
        ctx: &RequestContext,
        field: &str,
        phrase: &str,
        slop: u32,
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::phrase(field, phrase, slop))
            .await
    }

    /// Aggregations only; the result carries no hits.
    pub async fn aggregate(
        &self,
        ctx: &RequestContext,
        aggregations: Map<String, Value>,
    ) -> Result<SearchResult<Product>, SearchError> {
        self.search(ctx, &SearchIntent::aggregation(aggregations))
            .await
    }
}
