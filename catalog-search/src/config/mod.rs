//! Configuration and dependency wiring for the catalog search client.

mod dependencies;

pub use dependencies::Dependencies;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::AppError;
use catalog_search_repository::config::{DEFAULT_INDEX, DEFAULT_URL};
use catalog_search_repository::{Auth, ConnectionConfig};

/// Engine connection settings, from flags or the environment.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Search engine URL
    #[arg(long = "url", env = "OPENSEARCH_URL", default_value = DEFAULT_URL, global = true)]
    pub url: String,

    /// Target index
    #[arg(long, env = "SEARCH_INDEX", default_value = DEFAULT_INDEX, global = true)]
    pub index: String,

    /// Basic auth username
    #[arg(long, env = "SEARCH_USERNAME", global = true)]
    pub username: Option<String>,

    /// Basic auth password
    #[arg(long, env = "SEARCH_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// API key id
    #[arg(long, env = "SEARCH_API_KEY_ID", global = true)]
    pub api_key_id: Option<String>,

    /// API key secret
    #[arg(long, env = "SEARCH_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// PEM file with the CA certificate of the engine
    #[arg(long, env = "SEARCH_CA_CERT", global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SEARCH_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    /// Resolve into a validated connection config.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig, AppError> {
        let auth = Auth::from_parts(
            self.username.clone(),
            self.password.clone(),
            self.api_key_id.clone(),
            self.api_key.clone(),
        )?;

        let mut config = ConnectionConfig::new(&self.url, &self.index)
            .with_auth(auth)
            .with_request_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(path) = &self.ca_cert {
            config = config.with_ca_cert(path);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_search_repository::SearchError;

    fn args() -> ConnectionArgs {
        ConnectionArgs {
            url: DEFAULT_URL.to_string(),
            index: DEFAULT_INDEX.to_string(),
            username: None,
            password: None,
            api_key_id: None,
            api_key: None,
            ca_cert: None,
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_defaults_resolve_without_auth() {
        let config = args().to_connection_config().unwrap();

        assert_eq!(config.url, "http://localhost:9200");
        assert_eq!(config.index, "products");
        assert_eq!(config.auth, Auth::None);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let mut args = args();
        args.username = Some("admin".to_string());

        let err = args.to_connection_config().unwrap_err();
        assert!(matches!(
            err,
            AppError::SearchError(SearchError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut args = args();
        args.timeout_secs = 0;

        assert!(args.to_connection_config().is_err());
    }
}
