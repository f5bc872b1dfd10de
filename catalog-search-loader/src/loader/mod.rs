//! Bulk loader for the catalog index.
//!
//! Records are accumulated into fixed-size batches, each batch is written
//! with one bulk call, and the index is refreshed once at the end. Batch
//! failures are recorded in the [`LoadSummary`] instead of aborting the load.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use catalog_search_repository::{RequestContext, SearchError, SearchTransport};
use catalog_search_shared::{BulkBatch, IndexableDocument};

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of records per bulk request.
    pub batch_size: usize,
    /// Keep going after a batch fails.
    pub continue_on_batch_failure: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            continue_on_batch_failure: true,
        }
    }
}

impl LoaderConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.batch_size == 0 {
            return Err(SearchError::construction("batch size must be positive"));
        }
        Ok(())
    }
}

/// Outcome of one bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// 1-based position of the batch within the load.
    pub sequence: usize,
    /// Records in the batch, including ones rejected before sending.
    pub submitted: usize,
    pub indexed_count: usize,
    pub failed_count: usize,
    /// First failure seen in this batch.
    pub first_error: Option<SearchError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.failed_count == 0
    }

    fn failed(sequence: usize, submitted: usize, error: SearchError) -> Self {
        Self {
            sequence,
            submitted,
            indexed_count: 0,
            failed_count: submitted,
            first_error: Some(error),
        }
    }
}

/// Result of a whole load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    /// Per-batch outcomes in submission order.
    pub batches: Vec<BatchOutcome>,
    /// Outcome of the final refresh.
    pub refresh: Result<(), SearchError>,
    /// Set when the load stopped before all records were submitted.
    pub aborted: bool,
}

impl LoadSummary {
    pub fn total_submitted(&self) -> usize {
        self.batches.iter().map(|b| b.submitted).sum()
    }

    pub fn total_indexed(&self) -> usize {
        self.batches.iter().map(|b| b.indexed_count).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.batches.iter().map(|b| b.failed_count).sum()
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.batches.iter().filter(|b| !b.is_success())
    }

    /// Whether every record was submitted and the refresh succeeded.
    ///
    /// Individual batch failures do not fail the load; inspect
    /// [`failed_batches`](Self::failed_batches) for those.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.refresh.is_ok()
    }
}

/// Loads records into one index through the bulk API.
pub struct BulkLoader {
    transport: Arc<dyn SearchTransport>,
    index: String,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a loader with the default configuration.
    pub fn new(transport: Arc<dyn SearchTransport>, index: impl Into<String>) -> Self {
        Self {
            transport,
            index: index.into(),
            config: LoaderConfig::default(),
        }
    }

    /// Create a loader with a custom configuration.
    ///
    /// A zero batch size is rejected as a construction error.
    pub fn with_config(
        transport: Arc<dyn SearchTransport>,
        index: impl Into<String>,
        config: LoaderConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            transport,
            index: index.into(),
            config,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Load all `records`, then refresh the index once.
    ///
    /// Batches are sent sequentially in input order. A cancelled context
    /// stops the load; the refresh is still attempted and reports
    /// `Cancelled`.
    #[instrument(skip(self, ctx, records), fields(index = %self.index, batch_size = self.config.batch_size))]
    pub async fn load<D, I>(&self, ctx: &RequestContext, records: I) -> LoadSummary
    where
        D: IndexableDocument,
        I: IntoIterator<Item = D>,
    {
        let mut batches = Vec::new();
        let mut aborted = false;
        let mut pending = BulkBatch::with_capacity(self.index.clone(), self.config.batch_size);

        for record in records {
            pending.push(&record);
            if pending.len() < self.config.batch_size {
                continue;
            }

            let outcome = self.flush(ctx, pending.take(), batches.len() + 1).await;
            let stop = self.should_stop(&outcome);
            batches.push(outcome);
            if stop {
                aborted = true;
                break;
            }
        }

        // Final partial batch
        if !aborted && !pending.is_empty() {
            let outcome = self.flush(ctx, pending.take(), batches.len() + 1).await;
            aborted = self.should_stop(&outcome);
            batches.push(outcome);
        }

        let refresh = self.refresh(ctx).await;

        let summary = LoadSummary {
            batches,
            refresh,
            aborted,
        };
        info!(
            batches = summary.batches.len(),
            indexed = summary.total_indexed(),
            failed = summary.total_failed(),
            aborted = summary.aborted,
            refreshed = summary.refresh.is_ok(),
            "Load finished"
        );
        summary
    }

    fn should_stop(&self, outcome: &BatchOutcome) -> bool {
        match &outcome.first_error {
            Some(SearchError::Cancelled) => true,
            Some(_) => !self.config.continue_on_batch_failure,
            None => false,
        }
    }

    /// Send one batch and attribute the outcome to it.
    async fn flush(&self, ctx: &RequestContext, batch: BulkBatch, sequence: usize) -> BatchOutcome {
        let submitted = batch.len();
        let mut outcome = BatchOutcome {
            sequence,
            submitted,
            indexed_count: 0,
            failed_count: batch.rejected().len(),
            first_error: batch.rejected().first().map(|r| {
                SearchError::construction(format!(
                    "record {} could not be serialized: {}",
                    r.id, r.reason
                ))
            }),
        };

        if batch.entries().is_empty() {
            return outcome;
        }

        debug!(batch = sequence, count = submitted, "Flushing batch");
        let sent = batch.entries().len();
        let response = match ctx
            .run(self.transport.bulk_write(&self.index, &batch))
            .await
            .and_then(|response| response.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                error!(batch = sequence, error = %e, "Bulk request failed");
                let mut failed = BatchOutcome::failed(sequence, submitted, e);
                if outcome.first_error.is_some() {
                    failed.first_error = outcome.first_error;
                }
                return failed;
            }
        };

        let (item_failures, item_error) = item_failures(&response.body, sent);
        outcome.indexed_count = sent - item_failures;
        outcome.failed_count += item_failures;
        if outcome.first_error.is_none() {
            outcome.first_error = item_error;
        }

        if outcome.is_success() {
            debug!(batch = sequence, indexed = outcome.indexed_count, "Batch indexed");
        } else {
            warn!(
                batch = sequence,
                indexed = outcome.indexed_count,
                failed = outcome.failed_count,
                "Batch partially failed"
            );
        }
        outcome
    }

    async fn refresh(&self, ctx: &RequestContext) -> Result<(), SearchError> {
        ctx.run(self.transport.refresh_index(&self.index))
            .await?
            .error_for_status()
            .map(|_| ())
            .inspect_err(|e| error!(error = %e, "Index refresh failed"))
    }
}

/// Count failed items in a bulk reply.
///
/// Returns the number of failed items and the first item error.
fn item_failures(body: &Value, sent: usize) -> (usize, Option<SearchError>) {
    let reported_errors = body.get("errors").and_then(Value::as_bool).unwrap_or(false);

    let Some(items) = body.get("items").and_then(Value::as_array) else {
        if reported_errors {
            return (
                sent,
                Some(SearchError::engine(200, "bulk reply reported errors without items")),
            );
        }
        return (0, None);
    };

    let mut failed = 0;
    let mut first_error = None;
    for item in items {
        // Each item is keyed by its action: {"index": {...}}
        let Some(result) = item.as_object().and_then(|action| action.values().next()) else {
            continue;
        };
        let Some(error) = result.get("error") else {
            continue;
        };

        failed += 1;
        if first_error.is_none() {
            let status = result
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(500);
            let kind = error.get("type").and_then(Value::as_str).unwrap_or("error");
            let reason = error.get("reason").and_then(Value::as_str).unwrap_or("");
            let id = result.get("_id").and_then(Value::as_str).unwrap_or("?");
            first_error = Some(SearchError::engine(
                status,
                format!("document {}: {}: {}", id, kind, reason),
            ));
        }
    }

    (failed.min(sent), first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockBulkTransport;
    use catalog_search_repository::RawResponse;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Row {
        id: String,
        value: usize,
    }

    impl IndexableDocument for Row {
        fn document_id(&self) -> &str {
            &self.id
        }
    }

    fn rows(count: usize) -> Vec<Row> {
        (1..=count)
            .map(|i| Row {
                id: i.to_string(),
                value: i,
            })
            .collect()
    }

    fn loader(mock: &Arc<MockBulkTransport>, batch_size: usize) -> BulkLoader {
        BulkLoader::with_config(
            mock.clone(),
            "products",
            LoaderConfig::default().with_batch_size(batch_size),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_batches_and_single_refresh() {
        let mock = Arc::new(MockBulkTransport::new());

        let summary = loader(&mock, 100)
            .load(&RequestContext::background(), rows(250))
            .await;

        assert_eq!(mock.batch_sizes().await, vec![100, 100, 50]);
        assert_eq!(mock.refresh_count().await, 1);
        assert_eq!(summary.batches.len(), 3);
        assert_eq!(summary.total_indexed(), 250);
        assert!(summary.is_success());
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_stop_load() {
        let mock = Arc::new(MockBulkTransport::new());
        mock.fail_batch(2, Err(SearchError::transport("connection reset")))
            .await;

        let summary = loader(&mock, 100)
            .load(&RequestContext::background(), rows(250))
            .await;

        assert_eq!(mock.batch_sizes().await, vec![100, 100, 50]);
        assert_eq!(mock.refresh_count().await, 1);

        assert!(summary.batches[0].is_success());
        assert!(!summary.batches[1].is_success());
        assert!(summary.batches[2].is_success());
        assert_eq!(summary.batches[1].failed_count, 100);
        assert!(summary.batches[1].first_error.as_ref().unwrap().is_retryable());
        assert_eq!(summary.total_indexed(), 150);
        // Batch failures alone do not fail the load
        assert!(summary.is_success());
    }

    #[tokio::test]
    async fn test_stop_on_failure_when_configured() {
        let mock = Arc::new(MockBulkTransport::new());
        mock.fail_batch(1, Ok(RawResponse::new(429, json!({"error": "too many requests"}))))
            .await;
        let config = LoaderConfig {
            batch_size: 10,
            continue_on_batch_failure: false,
        };
        let loader = BulkLoader::with_config(mock.clone(), "products", config).unwrap();

        let summary = loader.load(&RequestContext::background(), rows(30)).await;

        assert_eq!(mock.batch_sizes().await, vec![10]);
        assert!(summary.aborted);
        assert!(!summary.is_success());
        assert_eq!(
            summary.batches[0].first_error,
            Some(SearchError::engine(429, "too many requests"))
        );
        assert_eq!(mock.refresh_count().await, 1);
    }

    #[tokio::test]
    async fn test_item_level_failures_are_counted() {
        let mock = Arc::new(MockBulkTransport::new());
        mock.fail_batch(
            1,
            Ok(RawResponse::new(
                200,
                json!({
                    "took": 4,
                    "errors": true,
                    "items": [
                        {"index": {"_id": "1", "status": 201, "result": "created"}},
                        {"index": {"_id": "2", "status": 400, "error": {
                            "type": "mapper_parsing_exception",
                            "reason": "failed to parse field [price]"
                        }}},
                        {"index": {"_id": "3", "status": 201, "result": "created"}}
                    ]
                }),
            )),
        )
        .await;

        let summary = loader(&mock, 100)
            .load(&RequestContext::background(), rows(3))
            .await;

        let batch = &summary.batches[0];
        assert_eq!(batch.indexed_count, 2);
        assert_eq!(batch.failed_count, 1);
        assert_eq!(
            batch.first_error,
            Some(SearchError::engine(
                400,
                "document 2: mapper_parsing_exception: failed to parse field [price]"
            ))
        );
    }

    #[tokio::test]
    async fn test_refresh_failure_fails_load() {
        let mock = Arc::new(MockBulkTransport::new());
        mock.fail_refresh(Err(SearchError::transport("connection refused")))
            .await;

        let summary = loader(&mock, 100)
            .load(&RequestContext::background(), rows(5))
            .await;

        assert_eq!(summary.total_indexed(), 5);
        assert!(summary.refresh.is_err());
        assert!(!summary.is_success());
    }

    #[tokio::test]
    async fn test_cancelled_load_stops() {
        let mock = Arc::new(MockBulkTransport::new());
        let (ctx, handle) = RequestContext::with_cancel();
        handle.cancel();

        let summary = loader(&mock, 10).load(&ctx, rows(25)).await;

        assert!(mock.batch_sizes().await.is_empty());
        assert_eq!(summary.batches.len(), 1);
        assert_eq!(summary.batches[0].first_error, Some(SearchError::Cancelled));
        assert!(summary.aborted);
        assert_eq!(summary.refresh, Err(SearchError::Cancelled));
    }

    #[tokio::test]
    async fn test_empty_input_still_refreshes() {
        let mock = Arc::new(MockBulkTransport::new());

        let summary = loader(&mock, 100)
            .load(&RequestContext::background(), Vec::<Row>::new())
            .await;

        assert!(summary.batches.is_empty());
        assert_eq!(mock.refresh_count().await, 1);
        assert!(summary.is_success());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mock = Arc::new(MockBulkTransport::new());
        let result = BulkLoader::with_config(
            mock,
            "products",
            LoaderConfig::default().with_batch_size(0),
        );

        assert!(matches!(result, Err(SearchError::ConstructionError(_))));
    }
}
