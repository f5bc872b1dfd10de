//! # Catalog Search Loader
//!
//! Bulk loading into the catalog index: fixed-size batching with per-batch
//! outcome reporting, a synthetic product generator and index seeding.

pub mod generator;
pub mod loader;
pub mod seeder;

#[cfg(test)]
mod test_support;

pub use generator::{GeneratorConfig, ProductGenerator};
pub use loader::{BatchOutcome, BulkLoader, LoadSummary, LoaderConfig};
pub use seeder::seed_products;
