//! Request/response logging for the client pipeline
//!
//! Emits one `tracing` event when a request leaves and one when its response
//! (or transport error) comes back. Sensitive header values are redacted.

use super::layer::{BoxedNext, ClientLayer, ResponseFuture};
use crate::request::ApiRequest;
use http::HeaderMap;
use std::time::Instant;

/// Logging format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One line per request and per response
    #[default]
    Compact,
    /// Also logs headers at debug level (sensitive values redacted)
    Detailed,
}

/// Headers whose values are never logged.
const REDACTED_HEADERS: &[&str] = &["cookie", "set-cookie", "authorization", "x-csrf-token"];

/// Logging middleware layer
#[derive(Clone, Debug)]
pub struct LoggingLayer {
    format: LogFormat,
    skip_paths: Vec<String>,
    redact: Vec<String>,
}

impl LoggingLayer {
    /// Create a new logging layer with default configuration
    pub fn new() -> Self {
        Self {
            format: LogFormat::Compact,
            skip_paths: Vec::new(),
            redact: REDACTED_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Set the logging format
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Add a path prefix to skip logging
    pub fn skip_path(mut self, path: impl Into<String>) -> Self {
        self.skip_paths.push(path.into());
        self
    }

    /// Redact an additional header (e.g. a custom CSRF header name)
    pub fn redact_header(mut self, name: impl Into<String>) -> Self {
        self.redact.push(name.into().to_ascii_lowercase());
        self
    }

    fn log_headers(&self, kind: &'static str, headers: &HeaderMap) {
        for (name, value) in headers {
            let value = if self.redact.iter().any(|r| r == name.as_str()) {
                "***"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            tracing::debug!(kind, header = %name, value = %value, "header");
        }
    }
}

impl Default for LoggingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientLayer for LoggingLayer {
    fn call(&self, req: ApiRequest, next: BoxedNext) -> ResponseFuture {
        let layer = self.clone();

        Box::pin(async move {
            let path = req.path().to_string();
            if layer.skip_paths.iter().any(|p| path.starts_with(p.as_str())) {
                return next(req).await;
            }

            let method = req.method().clone();
            tracing::info!(method = %method, path = %path, "request started");
            if layer.format == LogFormat::Detailed {
                layer.log_headers("request", req.headers());
            }

            let start = Instant::now();
            let result = next(req).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(resp) => {
                    tracing::info!(
                        method = %method,
                        path = %path,
                        status = resp.status().as_u16(),
                        duration_ms,
                        "request completed"
                    );
                    if layer.format == LogFormat::Detailed {
                        layer.log_headers("response", resp.headers());
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        method = %method,
                        path = %path,
                        duration_ms,
                        error = %err,
                        "request failed"
                    );
                }
            }

            result
        })
    }

    fn clone_box(&self) -> Box<dyn ClientLayer> {
        Box::new(self.clone())
    }
}
