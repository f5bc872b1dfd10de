//! Error types for the catalog search repository.

mod extraction_error;
mod search_error;

pub use extraction_error::ExtractionError;
pub use search_error::SearchError;
