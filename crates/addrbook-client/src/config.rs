//! Client configuration with environment variable support.
//!
//! Values are read from `ADDRBOOK_*` environment variables (optionally
//! seeded from a `.env` file) and every field falls back to a default
//! suitable for local development.
//!
//! # Example
//!
//! ```ignore
//! use addrbook_client::config::{load_dotenv, ClientConfig};
//!
//! load_dotenv();
//! let config = ClientConfig::from_env()?;
//! println!("API: {}", config.base_url);
//! ```

use crate::csrf::{CsrfConfig, MatchRule};
use crate::error::ConfigError;
use reqwest::Url;
use serde::Deserialize;

/// Prefix for every environment variable read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "ADDRBOOK";

/// Default API root used when `ADDRBOOK_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/";

/// Top-level client configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// API root every request path is appended to.
    pub base_url: String,
    /// Path segment marking a route as protected.
    pub protected_segment: String,
    /// How `protected_segment` is matched against request paths.
    pub match_rule: MatchRule,
    /// Header carrying the CSRF token on protected requests.
    pub csrf_header: String,
    /// Cookie name the server uses for the token.
    pub csrf_cookie: String,
    /// JSON body field the server may use for the token.
    pub csrf_body_field: String,
    /// Emit a tracing event per request.
    pub log_requests: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            protected_segment: "/v1/".to_string(),
            match_rule: MatchRule::Substring,
            csrf_header: "X-CSRF-Token".to_string(),
            csrf_cookie: "csrf_token".to_string(),
            csrf_body_field: "csrfToken".to_string(),
            log_requests: true,
        }
    }
}

impl ClientConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `ADDRBOOK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_prefixed(ENV_PREFIX)
    }

    /// Load configuration from `<prefix>_*` environment variables.
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        let config: Self = envy::prefixed(format!("{}_", prefix)).from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the protected path segment.
    pub fn protected_segment(mut self, segment: impl Into<String>) -> Self {
        self.protected_segment = segment.into();
        self
    }

    /// Set the route match rule.
    pub fn match_rule(mut self, rule: MatchRule) -> Self {
        self.match_rule = rule;
        self
    }

    /// Set the CSRF header name.
    pub fn csrf_header(mut self, name: impl Into<String>) -> Self {
        self.csrf_header = name.into();
        self
    }

    /// Set the CSRF cookie name.
    pub fn csrf_cookie(mut self, name: impl Into<String>) -> Self {
        self.csrf_cookie = name.into();
        self
    }

    /// Enable or disable per-request logging.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::Invalid {
            field: "base_url",
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: "not a hierarchical URL".to_string(),
            });
        }
        if self.protected_segment.is_empty() {
            return Err(ConfigError::Invalid {
                field: "protected_segment",
                reason: "must not be empty".to_string(),
            });
        }
        if http::HeaderName::from_bytes(self.csrf_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid {
                field: "csrf_header",
                reason: format!("`{}` is not a valid header name", self.csrf_header),
            });
        }
        Ok(())
    }

    /// Resolve a request path against the base URL.
    ///
    /// The base's trailing `/` and the path's leading `/` are collapsed into a
    /// single separator, so `/v1/users` under `http://host/api/` becomes
    /// `http://host/api/v1/users`. Absolute URLs are used as-is.
    pub fn resolve(&self, path: &str) -> Option<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).ok();
        }
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).ok()
    }

    /// The token-layer subset of this configuration.
    pub fn csrf(&self) -> CsrfConfig {
        CsrfConfig::new()
            .header_name(self.csrf_header.clone())
            .cookie_name(self.csrf_cookie.clone())
            .body_field(self.csrf_body_field.clone())
            .protected_segment(self.protected_segment.clone())
            .match_rule(self.match_rule)
    }
}

/// Load environment variables from a `.env` file.
///
/// Missing files are ignored and existing variables take precedence.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
