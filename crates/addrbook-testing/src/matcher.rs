use http::{HeaderMap, Method};
use serde_json::Value;

/// Matcher for HTTP requests
///
/// Every criterion that is set must hold. An empty matcher matches anything.
#[derive(Debug, Clone, Default)]
pub struct RequestMatcher {
    pub(crate) method: Option<Method>,
    pub(crate) path: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) absent_headers: Vec<String>,
    pub(crate) body_json: Option<Value>,
}

impl RequestMatcher {
    /// Create a new matcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a specific HTTP method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Match an exact path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Shorthand for `method(m).path(p)`
    pub fn route(self, method: Method, path: impl Into<String>) -> Self {
        self.method(method).path(path)
    }

    /// Require a header with an exact value
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Require a header to be missing
    pub fn header_absent(mut self, key: impl Into<String>) -> Self {
        self.absent_headers.push(key.into());
        self
    }

    /// Match a JSON body, ignoring formatting and key order.
    ///
    /// A value that fails to serialize makes the matcher never match.
    pub fn body_json(mut self, body: impl serde::Serialize) -> Self {
        self.body_json = Some(serde_json::to_value(body).unwrap_or(Value::Null));
        self
    }

    /// Check if the matcher matches a request
    pub fn matches(&self, method: &Method, path: &str, headers: &HeaderMap, body: &[u8]) -> bool {
        if self.method.as_ref().is_some_and(|m| m != method) {
            return false;
        }

        if self.path.as_deref().is_some_and(|p| p != path) {
            return false;
        }

        for (k, v) in &self.headers {
            match headers.get(k.as_str()) {
                Some(val) if val == v.as_str() => {}
                _ => return false,
            }
        }

        if self
            .absent_headers
            .iter()
            .any(|k| headers.contains_key(k.as_str()))
        {
            return false;
        }

        if let Some(expected) = &self.body_json {
            match serde_json::from_slice::<Value>(body) {
                Ok(actual) if &actual == expected => {}
                _ => return false,
            }
        }

        true
    }
}
