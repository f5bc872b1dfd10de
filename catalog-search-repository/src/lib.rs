//! # Catalog Search Repository
//!
//! This crate provides the query layer in front of the search engine: query
//! construction from search intents, request execution with cancellation,
//! response normalization, point document operations and index
//! administration. The transport is abstracted behind [`SearchTransport`]
//! with a concrete implementation for OpenSearch.

pub mod config;
pub mod context;
pub mod errors;
pub mod executor;
pub mod extract;
pub mod index_manager;
pub mod interfaces;
pub mod opensearch;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{Auth, ConnectionConfig};
pub use context::{CancelHandle, RequestContext};
pub use errors::{ExtractionError, SearchError};
pub use executor::SearchExecutor;
pub use extract::extract_search_result;
pub use index_manager::IndexManager;
pub use interfaces::SearchTransport;
pub use opensearch::{build_search_query, product_index_settings, OpenSearchTransport};
pub use store::DocumentStore;
pub use types::{RawResponse, WriteMode};
