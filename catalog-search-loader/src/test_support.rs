//! Mock transport for loader and seeder tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use catalog_search_repository::{RawResponse, SearchError, SearchTransport, WriteMode};
use catalog_search_shared::{BulkBatch, QueryDocument};

#[derive(Default)]
struct State {
    batches: Vec<Vec<String>>,
    batch_replies: HashMap<usize, Result<RawResponse, SearchError>>,
    refreshes: usize,
    refresh_reply: Option<Result<RawResponse, SearchError>>,
    admin_calls: Vec<&'static str>,
    created_with: Option<Value>,
}

/// Records bulk writes and index administration; everything else is inert.
#[derive(Default)]
pub(crate) struct MockBulkTransport {
    state: Mutex<State>,
}

impl MockBulkTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reply for the n-th (1-based) bulk call.
    pub async fn fail_batch(&self, sequence: usize, reply: Result<RawResponse, SearchError>) {
        self.state.lock().await.batch_replies.insert(sequence, reply);
    }

    pub async fn fail_refresh(&self, reply: Result<RawResponse, SearchError>) {
        self.state.lock().await.refresh_reply = Some(reply);
    }

    pub async fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().await.batches.iter().map(Vec::len).collect()
    }

    pub async fn batch_ids(&self) -> Vec<Vec<String>> {
        self.state.lock().await.batches.clone()
    }

    pub async fn refresh_count(&self) -> usize {
        self.state.lock().await.refreshes
    }

    pub async fn admin_calls(&self) -> Vec<&'static str> {
        self.state.lock().await.admin_calls.clone()
    }

    pub async fn created_with(&self) -> Option<Value> {
        self.state.lock().await.created_with.clone()
    }

    async fn admin(&self, op: &'static str) -> Result<RawResponse, SearchError> {
        self.state.lock().await.admin_calls.push(op);
        Ok(RawResponse::new(200, json!({"acknowledged": true})))
    }
}

fn inert() -> Result<RawResponse, SearchError> {
    Ok(RawResponse::new(200, json!({})))
}

#[async_trait]
impl SearchTransport for MockBulkTransport {
    async fn search(&self, _index: &str, _query: &QueryDocument) -> Result<RawResponse, SearchError> {
        inert()
    }

    async fn bulk_write(&self, _index: &str, batch: &BulkBatch) -> Result<RawResponse, SearchError> {
        let mut state = self.state.lock().await;
        state
            .batches
            .push(batch.entries().iter().map(|e| e.id.clone()).collect());
        let sequence = state.batches.len();
        state
            .batch_replies
            .remove(&sequence)
            .unwrap_or_else(|| Ok(RawResponse::new(200, json!({"errors": false, "items": []}))))
    }

    async fn refresh_index(&self, _index: &str) -> Result<RawResponse, SearchError> {
        let mut state = self.state.lock().await;
        state.refreshes += 1;
        state.refresh_reply.clone().unwrap_or_else(inert)
    }

    async fn get_by_id(&self, _index: &str, _id: &str) -> Result<RawResponse, SearchError> {
        inert()
    }

    async fn delete_by_id(&self, _index: &str, _id: &str) -> Result<RawResponse, SearchError> {
        inert()
    }

    async fn put_document(
        &self,
        _index: &str,
        _id: &str,
        _document: &Value,
        _mode: WriteMode,
    ) -> Result<RawResponse, SearchError> {
        inert()
    }

    async fn update_document(
        &self,
        _index: &str,
        _id: &str,
        _partial: &Value,
    ) -> Result<RawResponse, SearchError> {
        inert()
    }

    async fn create_index(&self, _index: &str, body: &Value) -> Result<RawResponse, SearchError> {
        self.state.lock().await.created_with = Some(body.clone());
        self.admin("create_index").await
    }

    async fn delete_index(&self, _index: &str) -> Result<RawResponse, SearchError> {
        self.admin("delete_index").await
    }

    async fn index_exists(&self, _index: &str) -> Result<RawResponse, SearchError> {
        self.admin("index_exists").await
    }

    async fn health_check(&self) -> Result<RawResponse, SearchError> {
        inert()
    }
}
