//! # Catalog Search Shared
//!
//! Data model shared by the query layer and the bulk loader: the product
//! document, search intents, the opaque query document, normalized search
//! results and bulk batches.

pub mod bulk;
pub mod document;
pub mod intent;
pub mod product;
pub mod result;

pub use bulk::{BulkBatch, BulkEntry, IndexableDocument, RejectedRecord};
pub use document::QueryDocument;
pub use intent::{BoolClauses, Fuzziness, PageWindow, RangeBounds, SearchIntent};
pub use product::Product;
pub use result::SearchResult;
