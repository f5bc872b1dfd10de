//! Bulk write batches.
//!
//! A batch is an ordered list of action/document pairs which renders to the
//! engine's newline-delimited bulk protocol: one metadata line naming the
//! target index and id, followed by one document line.

use serde::Serialize;
use serde_json::{json, Value};

/// A record that can be written through the bulk API.
pub trait IndexableDocument: Serialize {
    /// The engine `_id` for this record.
    fn document_id(&self) -> &str;
}

/// One action/document pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkEntry {
    pub id: String,
    pub action: Value,
    pub document: Value,
}

/// A record that could not be serialized and never left the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub id: String,
    pub reason: String,
}

/// An ordered batch of index actions for a single target index.
#[derive(Debug, Clone)]
pub struct BulkBatch {
    index: String,
    entries: Vec<BulkEntry>,
    rejected: Vec<RejectedRecord>,
}

impl BulkBatch {
    pub fn new(index: impl Into<String>) -> Self {
        Self::with_capacity(index, 0)
    }

    pub fn with_capacity(index: impl Into<String>, capacity: usize) -> Self {
        Self {
            index: index.into(),
            entries: Vec::with_capacity(capacity),
            rejected: Vec::new(),
        }
    }

    /// Append an index action for `record`.
    ///
    /// A record that fails to serialize is kept as a rejection so it still
    /// counts toward the batch and shows up as a failure in its outcome.
    pub fn push<D: IndexableDocument>(&mut self, record: &D) {
        let id = record.document_id().to_string();
        match serde_json::to_value(record) {
            Ok(document) => self.entries.push(BulkEntry {
                action: json!({ "index": { "_index": self.index, "_id": id } }),
                id,
                document,
            }),
            Err(e) => self.rejected.push(RejectedRecord {
                id,
                reason: e.to_string(),
            }),
        }
    }

    /// Target index.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Records accepted into the batch, including rejected ones.
    pub fn len(&self) -> usize {
        self.entries.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.rejected.is_empty()
    }

    /// Serializable entries, in insertion order.
    pub fn entries(&self) -> &[BulkEntry] {
        &self.entries
    }

    /// Records that failed to serialize.
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Action and document lines, interleaved.
    pub fn lines(&self) -> Vec<Value> {
        let mut lines = Vec::with_capacity(self.entries.len() * 2);
        for entry in &self.entries {
            lines.push(entry.action.clone());
            lines.push(entry.document.clone());
        }
        lines
    }

    /// NDJSON body, each line terminated by `\n`.
    pub fn to_ndjson(&self) -> String {
        let mut body = String::new();
        for line in self.lines() {
            body.push_str(&line.to_string());
            body.push('\n');
        }
        body
    }

    /// Move the current contents out, leaving an empty batch for the same index.
    pub fn take(&mut self) -> BulkBatch {
        let capacity = self.entries.capacity();
        std::mem::replace(self, BulkBatch::with_capacity(self.index.clone(), capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Note {
        id: String,
        text: String,
    }

    impl IndexableDocument for Note {
        fn document_id(&self) -> &str {
            &self.id
        }
    }

    struct Broken {
        id: String,
    }

    impl Serialize for Broken {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot encode"))
        }
    }

    impl IndexableDocument for Broken {
        fn document_id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str) -> Note {
        Note {
            id: id.to_string(),
            text: format!("note {}", id),
        }
    }

    #[test]
    fn test_push_builds_index_action() {
        let mut batch = BulkBatch::new("notes");
        batch.push(&note("1"));

        let entry = &batch.entries()[0];
        assert_eq!(entry.action, json!({"index": {"_index": "notes", "_id": "1"}}));
        assert_eq!(entry.document["text"], "note 1");
    }

    #[test]
    fn test_ndjson_layout() {
        let mut batch = BulkBatch::new("notes");
        batch.push(&note("1"));
        batch.push(&note("2"));

        let body = batch.to_ndjson();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(body.ends_with('\n'));
        let second_action: Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(second_action["index"]["_id"], "2");
        let second_doc: HashMap<String, String> = serde_json::from_str(lines[3]).unwrap();
        assert_eq!(second_doc["text"], "note 2");
    }

    #[test]
    fn test_rejected_records_count_toward_len() {
        let mut batch = BulkBatch::new("notes");
        batch.push(&note("1"));
        batch.push(&Broken {
            id: "2".to_string(),
        });

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.entries().len(), 1);
        assert_eq!(batch.rejected()[0].id, "2");
        assert_eq!(batch.lines().len(), 2);
    }

    #[test]
    fn test_take_resets_batch() {
        let mut batch = BulkBatch::new("notes");
        batch.push(&note("1"));

        let full = batch.take();
        assert_eq!(full.len(), 1);
        assert!(batch.is_empty());
        assert_eq!(batch.index(), "notes");
    }
}
