//! Connection configuration for the search engine client.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::SearchError;

/// Default engine URL.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Default target index.
pub const DEFAULT_INDEX: &str = "products";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the client authenticates against the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    /// No credentials (security plugin disabled).
    #[default]
    None,
    /// HTTP basic authentication.
    Basic { username: String, password: String },
    /// API key authentication.
    ApiKey { id: String, key: String },
}

impl Auth {
    /// Resolve credentials from optional parts.
    ///
    /// An API key wins over username/password when both are complete. A
    /// username without a password, or a key id without the key, is
    /// rejected rather than silently ignored.
    pub fn from_parts(
        username: Option<String>,
        password: Option<String>,
        api_key_id: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, SearchError> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        match (non_empty(api_key_id), non_empty(api_key)) {
            (Some(id), Some(key)) => return Ok(Auth::ApiKey { id, key }),
            (Some(_), None) => {
                return Err(SearchError::configuration(
                    "API key id is set but the API key is missing",
                ))
            }
            (None, Some(_)) => {
                return Err(SearchError::configuration(
                    "API key is set but the API key id is missing",
                ))
            }
            (None, None) => {}
        }

        match (non_empty(username), non_empty(password)) {
            (Some(username), Some(password)) => Ok(Auth::Basic { username, password }),
            (Some(_), None) => Err(SearchError::configuration(
                "username is set but the password is missing",
            )),
            (None, Some(_)) => Err(SearchError::configuration(
                "password is set but the username is missing",
            )),
            (None, None) => Ok(Auth::None),
        }
    }
}

/// Configuration shared by every client built on one engine connection.
///
/// Read-only once built; safe to share between concurrent callers.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Engine base URL.
    pub url: String,
    /// Target index name.
    pub index: String,
    /// Credentials.
    pub auth: Auth,
    /// PEM file with the CA certificate used to validate the engine.
    pub ca_cert_path: Option<PathBuf>,
    /// Timeout applied by the transport to each request.
    pub request_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            index: DEFAULT_INDEX.to_string(),
            auth: Auth::None,
            ca_cert_path: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ConnectionConfig {
    /// Create a config for the given URL and index with defaults elsewhere.
    pub fn new(url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: index.into(),
            ..Default::default()
        }
    }

    /// Set the credentials.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Set the CA certificate path.
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the settings that can be verified without contacting the engine.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.url.trim().is_empty() {
            return Err(SearchError::configuration("url is required"));
        }
        if self.index.trim().is_empty() {
            return Err(SearchError::configuration("index is required"));
        }
        if self.request_timeout.is_zero() {
            return Err(SearchError::configuration(
                "request timeout must be greater than zero",
            ));
        }
        Ok(())
    }
}
