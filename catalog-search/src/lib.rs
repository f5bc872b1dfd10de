//! # Catalog Search
//!
//! Command-line client for the product catalog index.
//!
//! This crate provides the configuration, dependency wiring and command
//! implementations behind the `catalog-search` binary.

pub mod cli;
pub mod commands;
pub mod config;

pub use config::Dependencies;

use catalog_search_repository::SearchError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A command argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// Output could not be rendered.
    #[error("Output error: {0}")]
    OutputError(#[from] serde_json::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether the command ended because the user cancelled it.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::SearchError(SearchError::Cancelled))
    }

    /// Process exit status for this error: 130 after Ctrl-C, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_cancelled() {
            130
        } else {
            1
        }
    }
}
