//! OpenSearch implementation of the search transport.
//!
//! This module provides a concrete implementation of `SearchTransport`
//! using OpenSearch as the backend, together with the query DSL builders
//! and the product index mapping.

mod client;
mod index_config;
mod queries;

pub use client::OpenSearchTransport;
pub use index_config::product_index_settings;
pub use queries::build_search_query;
