//! Error types for the address-book client

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors surfaced by [`ApiClient`](crate::ApiClient) and the API modules.
///
/// A missing CSRF token or a malformed `Set-Cookie` value is never an error;
/// the token layer simply proceeds without a header.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or transport failure, passed through untouched.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status returned by the server
        status: StatusCode,
        /// Raw response body
        body: bytes::Bytes,
    },

    /// A success response carried a body that did not decode.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request payload failed to serialize.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The base URL and request path did not form a valid URL.
    #[error("invalid url: base `{base}` with path `{path}`")]
    InvalidUrl {
        /// Configured base URL
        base: String,
        /// Request path
        path: String,
    },

    /// A configured header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Client-side validation rejected the payload before sending.
    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The client was built from an unusable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ClientError {
    /// HTTP status of a [`ClientError::Status`] error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Message suitable for showing to a user.
    ///
    /// Prefers the server's `{"error": "..."}` field, then a non-empty text
    /// body, then the status reason.
    pub fn message(&self) -> String {
        match self {
            ClientError::Status { status, body } => {
                if let Ok(ErrorBody { error: Some(msg) }) = serde_json::from_slice(body) {
                    return msg;
                }
                match std::str::from_utf8(body).map(str::trim) {
                    Ok(text) if !text.is_empty() => text.to_string(),
                    _ => status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string(),
                }
            }
            other => other.to_string(),
        }
    }

    /// Like [`message`](Self::message), but only trusts the server's
    /// structured `error` field and otherwise uses `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        if let ClientError::Status { body, .. } = self {
            if let Ok(ErrorBody { error: Some(msg) }) = serde_json::from_slice(body) {
                return msg;
            }
        }
        fallback.to_string()
    }

    /// True when the server rejected the session (401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

/// Error type for configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable deserialization failed.
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),

    /// A value was present but unusable.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}
