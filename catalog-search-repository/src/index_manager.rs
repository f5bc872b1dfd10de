//! Index administration.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use crate::context::RequestContext;
use crate::errors::SearchError;
use crate::interfaces::SearchTransport;

/// Creates, recreates and checks one index.
#[derive(Clone)]
pub struct IndexManager {
    transport: Arc<dyn SearchTransport>,
    index: String,
    settings: Value,
}

impl IndexManager {
    /// Manage `index` with the given settings and mappings body.
    pub fn new(transport: Arc<dyn SearchTransport>, index: impl Into<String>, settings: Value) -> Self {
        Self {
            transport,
            index: index.into(),
            settings,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Whether the index exists.
    pub async fn exists(&self, ctx: &RequestContext) -> Result<bool, SearchError> {
        let response = ctx.run(self.transport.index_exists(&self.index)).await?;
        if response.is_not_found() {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }

    /// Create the index unless it already exists.
    ///
    /// Returns `true` when the index was created by this call.
    #[instrument(skip(self, ctx), fields(index = %self.index))]
    pub async fn ensure_index(&self, ctx: &RequestContext) -> Result<bool, SearchError> {
        if self.exists(ctx).await? {
            return Ok(false);
        }
        self.create(ctx).await?;
        Ok(true)
    }

    /// Drop the index if present and create it again, empty.
    #[instrument(skip(self, ctx), fields(index = %self.index))]
    pub async fn recreate_index(&self, ctx: &RequestContext) -> Result<(), SearchError> {
        let response = ctx.run(self.transport.delete_index(&self.index)).await?;
        if !response.is_not_found() {
            response.error_for_status()?;
            info!("Deleted existing index");
        }
        self.create(ctx).await
    }

    /// Cluster health as reported by the engine.
    pub async fn health_check(&self, ctx: &RequestContext) -> Result<Value, SearchError> {
        let response = ctx
            .run(self.transport.health_check())
            .await?
            .error_for_status()?;
        Ok(response.body)
    }

    async fn create(&self, ctx: &RequestContext) -> Result<(), SearchError> {
        ctx.run(self.transport.create_index(&self.index, &self.settings))
            .await?
            .error_for_status()?;
        info!(index = %self.index, "Created index");
        Ok(())
    }
}
