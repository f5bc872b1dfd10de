//! Search transport trait definition.
//!
//! This module defines the abstract interface to the remote search engine,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! in-memory mocks for tests).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{RawResponse, WriteMode};
use catalog_search_shared::{BulkBatch, QueryDocument};

/// Abstract interface for search engine operations.
///
/// Implementations return a [`RawResponse`] for every reply the engine
/// produced, whatever its status; interpreting the status is up to the
/// caller. `Err` is reserved for failures to reach the engine or to read its
/// reply, always as `SearchError::TransportError`.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one transport can be shared
/// by concurrent callers.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Run a search request against `index`.
    async fn search(&self, index: &str, query: &QueryDocument) -> Result<RawResponse, SearchError>;

    /// Submit one bulk batch as a newline-delimited payload.
    async fn bulk_write(&self, index: &str, batch: &BulkBatch) -> Result<RawResponse, SearchError>;

    /// Make recently written documents visible to search.
    async fn refresh_index(&self, index: &str) -> Result<RawResponse, SearchError>;

    /// Fetch a single document by id.
    async fn get_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError>;

    /// Delete a single document by id.
    async fn delete_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError>;

    /// Write a full document under `id`.
    async fn put_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
        mode: WriteMode,
    ) -> Result<RawResponse, SearchError>;

    /// Merge `partial` into the existing document `id`.
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &Value,
    ) -> Result<RawResponse, SearchError>;

    /// Create `index` with the given settings and mappings body.
    async fn create_index(&self, index: &str, body: &Value) -> Result<RawResponse, SearchError>;

    /// Delete `index`.
    async fn delete_index(&self, index: &str) -> Result<RawResponse, SearchError>;

    /// Check whether `index` exists (200) or not (404).
    async fn index_exists(&self, index: &str) -> Result<RawResponse, SearchError>;

    /// Fetch cluster health.
    async fn health_check(&self) -> Result<RawResponse, SearchError>;
}
