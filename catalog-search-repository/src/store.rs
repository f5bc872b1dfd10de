//! Point document operations.
//!
//! `DocumentStore` covers single-document create, replace, partial update,
//! lookup and delete, plus a free-text search helper over the same index.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::errors::{ExtractionError, SearchError};
use crate::executor::SearchExecutor;
use crate::extract::decode_source;
use crate::interfaces::SearchTransport;
use crate::types::{RawResponse, WriteMode};
use catalog_search_shared::{SearchIntent, SearchResult};

/// Single-document access to one index.
#[derive(Clone)]
pub struct DocumentStore {
    transport: Arc<dyn SearchTransport>,
    executor: SearchExecutor,
    index: String,
}

impl DocumentStore {
    pub fn new(transport: Arc<dyn SearchTransport>, index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            executor: SearchExecutor::new(transport.clone(), index.clone()),
            transport,
            index,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Create a document; fails with a 409 engine error if `id` exists.
    #[instrument(skip(self, ctx, document), fields(index = %self.index))]
    pub async fn create<D: Serialize>(
        &self,
        ctx: &RequestContext,
        id: &str,
        document: &D,
    ) -> Result<(), SearchError> {
        self.write(ctx, id, document, WriteMode::Create).await
    }

    /// Create or fully replace a document.
    #[instrument(skip(self, ctx, document), fields(index = %self.index))]
    pub async fn index_document<D: Serialize>(
        &self,
        ctx: &RequestContext,
        id: &str,
        document: &D,
    ) -> Result<(), SearchError> {
        self.write(ctx, id, document, WriteMode::Index).await
    }

    /// Merge the fields of `partial` into an existing document.
    #[instrument(skip(self, ctx, partial), fields(index = %self.index))]
    pub async fn update<D: Serialize>(
        &self,
        ctx: &RequestContext,
        id: &str,
        partial: &D,
    ) -> Result<(), SearchError> {
        validate_id(id)?;
        let partial = to_body(partial)?;

        let response = ctx
            .run(self.transport.update_document(&self.index, id, &partial))
            .await?;
        self.missing_as_not_found(&response, id)?;
        response.error_for_status()?;

        debug!(id = %id, "Document updated");
        Ok(())
    }

    /// Fetch a document by id.
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The stored document
    /// * `Err(SearchError::NotFound)` - No document with this id
    /// * `Err(SearchError::EngineError)` - Any other engine failure, including a missing index
    #[instrument(skip(self, ctx), fields(index = %self.index))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        id: &str,
    ) -> Result<T, SearchError> {
        validate_id(id)?;

        let response = ctx.run(self.transport.get_by_id(&self.index, id)).await?;
        self.missing_as_not_found(&response, id)?;
        let response = response.error_for_status()?;

        if response.body.get("found").and_then(Value::as_bool) == Some(false) {
            return Err(SearchError::not_found(&self.index, id));
        }

        let source = response
            .body
            .get("_source")
            .filter(|source| !source.is_null())
            .ok_or(ExtractionError::MissingSource { position: 0 })?;
        Ok(decode_source(source, 0)?)
    }

    /// Delete a document by id.
    #[instrument(skip(self, ctx), fields(index = %self.index))]
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), SearchError> {
        validate_id(id)?;

        let response = ctx
            .run(self.transport.delete_by_id(&self.index, id))
            .await?;
        self.missing_as_not_found(&response, id)?;
        response.error_for_status()?;

        debug!(id = %id, "Document deleted");
        Ok(())
    }

    /// Multi-field text search over this index.
    pub async fn search_text<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        query: &str,
        fields: &[&str],
    ) -> Result<SearchResult<T>, SearchError> {
        self.executor
            .search(ctx, &SearchIntent::multi_match(query, fields.iter().copied()))
            .await
    }

    async fn write<D: Serialize>(
        &self,
        ctx: &RequestContext,
        id: &str,
        document: &D,
        mode: WriteMode,
    ) -> Result<(), SearchError> {
        validate_id(id)?;
        let body = to_body(document)?;

        ctx.run(self.transport.put_document(&self.index, id, &body, mode))
            .await?
            .error_for_status()?;

        debug!(id = %id, mode = ?mode, "Document written");
        Ok(())
    }

    /// A 404 without an error envelope, or with `document_missing_exception`,
    /// means the document is absent. Any other 404 error (e.g.
    /// `index_not_found_exception`) stays an engine error.
    fn missing_as_not_found(&self, response: &RawResponse, id: &str) -> Result<(), SearchError> {
        if !response.is_not_found() {
            return Ok(());
        }
        let document_missing = match response.body.get("error") {
            None => true,
            Some(error) => {
                error.get("type").and_then(Value::as_str) == Some("document_missing_exception")
            }
        };
        if document_missing {
            return Err(SearchError::not_found(&self.index, id));
        }
        Ok(())
    }
}

fn validate_id(id: &str) -> Result<(), SearchError> {
    if id.trim().is_empty() {
        return Err(SearchError::construction("document id is required"));
    }
    Ok(())
}

fn to_body<D: Serialize>(document: &D) -> Result<Value, SearchError> {
    serde_json::to_value(document)
        .map_err(|e| SearchError::construction(format!("document is not serializable: {}", e)))
}
