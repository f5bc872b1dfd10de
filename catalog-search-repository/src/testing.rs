//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::errors::SearchError;
use crate::interfaces::SearchTransport;
use crate::types::{RawResponse, WriteMode};
use catalog_search_shared::{BulkBatch, QueryDocument};

/// One call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub op: &'static str,
    pub index: String,
    pub id: Option<String>,
    pub body: Option<Value>,
}

/// Mock transport replaying scripted replies per operation.
///
/// Unscripted calls answer `200 {}`. Operations marked as hanging never
/// complete, for cancellation tests.
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Arc<Mutex<HashMap<&'static str, VecDeque<Result<RawResponse, SearchError>>>>>,
    hanging: Vec<&'static str>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call of `op`.
    pub async fn reply(&self, op: &'static str, reply: Result<RawResponse, SearchError>) {
        self.replies
            .lock()
            .await
            .entry(op)
            .or_default()
            .push_back(reply);
    }

    pub fn hang_on(mut self, op: &'static str) -> Self {
        self.hanging.push(op);
        self
    }

    pub async fn calls_to(&self, op: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.op == op)
            .cloned()
            .collect()
    }

    async fn respond(
        &self,
        op: &'static str,
        index: &str,
        id: Option<&str>,
        body: Option<Value>,
    ) -> Result<RawResponse, SearchError> {
        self.calls.lock().await.push(RecordedCall {
            op,
            index: index.to_string(),
            id: id.map(str::to_string),
            body,
        });

        if self.hanging.contains(&op) {
            std::future::pending::<()>().await;
        }

        let scripted = self
            .replies
            .lock()
            .await
            .get_mut(op)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(RawResponse::new(200, json!({}))))
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn search(&self, index: &str, query: &QueryDocument) -> Result<RawResponse, SearchError> {
        self.respond("search", index, None, Some(query.as_value().clone()))
            .await
    }

    async fn bulk_write(&self, index: &str, batch: &BulkBatch) -> Result<RawResponse, SearchError> {
        let ids: Vec<&str> = batch.entries().iter().map(|e| e.id.as_str()).collect();
        self.respond("bulk_write", index, None, Some(json!(ids))).await
    }

    async fn refresh_index(&self, index: &str) -> Result<RawResponse, SearchError> {
        self.respond("refresh_index", index, None, None).await
    }

    async fn get_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError> {
        self.respond("get_by_id", index, Some(id), None).await
    }

    async fn delete_by_id(&self, index: &str, id: &str) -> Result<RawResponse, SearchError> {
        self.respond("delete_by_id", index, Some(id), None).await
    }

    async fn put_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
        mode: WriteMode,
    ) -> Result<RawResponse, SearchError> {
        let op = match mode {
            WriteMode::Index => "put_document",
            WriteMode::Create => "create_document",
        };
        self.respond(op, index, Some(id), Some(document.clone()))
            .await
    }

    async fn update_document(
        &self,
        index: &str,
        id: &str,
        partial: &Value,
    ) -> Result<RawResponse, SearchError> {
        self.respond("update_document", index, Some(id), Some(partial.clone()))
            .await
    }

    async fn create_index(&self, index: &str, body: &Value) -> Result<RawResponse, SearchError> {
        self.respond("create_index", index, None, Some(body.clone()))
            .await
    }

    async fn delete_index(&self, index: &str) -> Result<RawResponse, SearchError> {
        self.respond("delete_index", index, None, None).await
    }

    async fn index_exists(&self, index: &str) -> Result<RawResponse, SearchError> {
        self.respond("index_exists", index, None, None).await
    }

    async fn health_check(&self) -> Result<RawResponse, SearchError> {
        self.respond("health_check", "", None, None).await
    }
}
