//! Dependency initialization and wiring for the catalog search client.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::AppError;
use catalog_search_loader::{BulkLoader, LoaderConfig};
use catalog_search_repository::{
    product_index_settings, ConnectionConfig, DocumentStore, IndexManager, OpenSearchTransport,
    RequestContext, SearchError, SearchExecutor, SearchTransport,
};

/// Container for all initialized dependencies.
///
/// Every component shares one transport and targets the configured index.
pub struct Dependencies {
    pub transport: Arc<dyn SearchTransport>,
    pub executor: SearchExecutor,
    pub store: DocumentStore,
    pub index_manager: IndexManager,
    pub index: String,
}

impl Dependencies {
    /// Build the OpenSearch transport and verify the cluster is reachable.
    pub async fn new(config: &ConnectionConfig, ctx: &RequestContext) -> Result<Self, AppError> {
        info!(
            url = %config.url,
            index = %config.index,
            timeout_secs = config.request_timeout.as_secs(),
            "Initializing dependencies"
        );

        let transport: Arc<dyn SearchTransport> = Arc::new(
            OpenSearchTransport::new(config)
                .map_err(|e| AppError::config(format!("Failed to create OpenSearch transport: {}", e)))?,
        );

        Self::connect(transport, &config.index, ctx).await
    }

    /// Wire components around `transport`, then run a cluster health check.
    ///
    /// An unreachable cluster or a `red` status is a configuration error.
    pub async fn connect(
        transport: Arc<dyn SearchTransport>,
        index: &str,
        ctx: &RequestContext,
    ) -> Result<Self, AppError> {
        let deps = Self::with_transport(transport, index);

        let health = match deps.index_manager.health_check(ctx).await {
            Ok(health) => health,
            Err(SearchError::Cancelled) => return Err(SearchError::Cancelled.into()),
            Err(e) => {
                return Err(AppError::config(format!(
                    "OpenSearch health check failed: {}",
                    e
                )))
            }
        };

        if health.get("status").and_then(Value::as_str) == Some("red") {
            return Err(AppError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");
        Ok(deps)
    }

    /// Wire components around an existing transport without contacting it.
    pub fn with_transport(transport: Arc<dyn SearchTransport>, index: &str) -> Self {
        Self {
            executor: SearchExecutor::new(transport.clone(), index),
            store: DocumentStore::new(transport.clone(), index),
            index_manager: IndexManager::new(transport.clone(), index, product_index_settings()),
            index: index.to_string(),
            transport,
        }
    }

    /// A bulk loader for the configured index.
    pub fn loader(&self, config: LoaderConfig) -> Result<BulkLoader, AppError> {
        Ok(BulkLoader::with_config(
            self.transport.clone(),
            self.index.clone(),
            config,
        )?)
    }
}
