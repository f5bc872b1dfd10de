//! OpenSearch transport implementation.
//!
//! This module provides the concrete implementation of `SearchTransport`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::{Certificate, CertificateValidation},
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts},
    BulkParts, CreateParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
    UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::{Auth, ConnectionConfig};
use crate::errors::SearchError;
use crate::interfaces::SearchTransport;
use crate::types::{RawResponse, WriteMode};
use catalog_search_shared::{BulkBatch, QueryDocument};

/// OpenSearch transport.
///
/// Every reply the engine produces comes back as a [`RawResponse`],
/// whatever its status. Only connection and read failures are errors.
///
/// # Example
///
/// ```ignore
/// use catalog_search_repository::{ConnectionConfig, OpenSearchTransport};
///
/// let config = ConnectionConfig::new("https://localhost:9200", "products")
///     .with_ca_cert("certs/ca.pem");
/// let transport = OpenSearchTransport::new(&config)?;
/// let health = transport.health_check().await?;
/// ```
pub struct OpenSearchTransport {
    client: OpenSearch,
}

impl OpenSearchTransport {
    /// Create a transport for the engine described by `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchTransport)` - A new transport; no request is sent yet
    /// * `Err(SearchError::ConfigurationError)` - Invalid URL, credentials or CA certificate
    pub fn new(config: &ConnectionConfig) -> Result<Self, SearchError> {
        config.validate()?;

        let url = Url::parse(&config.url)
            .map_err(|e| SearchError::configuration(format!("invalid url '{}': {}", config.url, e)))?;

        let conn_pool = SingleNodeConnectionPool::new(url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout);

        match &config.auth {
            Auth::None => {}
            Auth::Basic { username, password } => {
                builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
            }
            Auth::ApiKey { id, key } => {
                builder = builder.auth(Credentials::ApiKey(id.clone(), key.clone()));
            }
        }

        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|e| {
                SearchError::configuration(format!(
                    "cannot read CA certificate {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let certificate = Certificate::from_pem(&pem)
                .map_err(|e| SearchError::configuration(format!("invalid CA certificate: {}", e)))?;
            builder = builder.cert_validation(CertificateValidation::Full(certificate));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchError::configuration(e.to_string()))?;

        info!(
            url = %config.url,
            index = %config.index,
            tls_ca = config.ca_cert_path.is_some(),
            "Created OpenSearch transport"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }
}

/// Read status and body. Non-JSON bodies are kept as a string; an empty
/// body (e.g. a HEAD reply) becomes `Value::Null`.
async fn read_response(response: Response) -> Result<RawResponse, SearchError> {
    let status = response.status_code().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| SearchError::transport(format!("failed to read response body: {}", e)))?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    debug!(status, "Received engine response");
    Ok(RawResponse::new(status, body))
}

fn send_error(e: opensearch::Error) -> SearchError {
    SearchError::transport(e.to_string())
}

#[async_trait]
impl SearchTransport for OpenSearchTransport {
    #[instrument(skip(self, query))]
    async fn search(&self, index: &str, query: &QueryDocument) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(query.as_value())
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self, batch), fields(count = batch.entries().len()))]
    async fn bulk_write(&self, index: &str, batch: &BulkBatch) -> Result<RawResponse, SearchError> {
        let body: Vec<JsonBody<Value>> = batch.lines().into_iter().map(Into::into).collect();

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn refresh_index(&self, index: &str) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self, document))]
    async fn put_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
        mode: WriteMode,
    ) -> Result<RawResponse, SearchError> {
        let sent = match mode {
            WriteMode::Index => {
                self.client
                    .index(IndexParts::IndexId(index, id))
                    .body(document)
                    .send()
                    .await
            }
            WriteMode::Create => {
                self.client
                    .create(CreateParts::IndexId(index, id))
                    .body(document)
                    .send()
                    .await
            }
        };
        read_response(sent.map_err(send_error)?).await
    }

    #[instrument(skip(self, partial))]
    async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &Value,
    ) -> Result<RawResponse, SearchError> {
        // API reference: https://docs.opensearch.org/latest/api-reference/document-apis/update-document/
        let response = self
            .client
            .update(UpdateParts::IndexId(index, id))
            .body(json!({ "doc": partial }))
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self, body))]
    async fn create_index(&self, index: &str, body: &Value) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<RawResponse, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(send_error)?;
        read_response(response).await
    }
}
