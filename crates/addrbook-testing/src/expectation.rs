use super::matcher::RequestMatcher;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use http::{HeaderMap, StatusCode};

/// A registered request pattern and the response it produces
#[derive(Debug, Clone)]
pub struct Expectation {
    pub(crate) matcher: RequestMatcher,
    pub(crate) response: MockResponse,
    pub(crate) times: Times,
    pub(crate) call_count: usize,
}

impl Expectation {
    /// Create a new expectation answering with an empty `200 OK`
    pub fn new(matcher: RequestMatcher) -> Self {
        Self {
            matcher,
            response: MockResponse::default(),
            times: Times::Any,
            call_count: 0,
        }
    }

    /// Whether the observed call count satisfies `times`
    pub fn is_satisfied(&self) -> bool {
        self.times.allows(self.call_count)
    }

    /// How often this expectation has been hit
    pub fn call_count(&self) -> usize {
        self.call_count
    }
}

/// How many times an expectation should be matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Times {
    /// Exactly one call
    Once,
    /// Exactly `n` calls
    Exactly(usize),
    /// `n` or more calls
    AtLeast(usize),
    /// At most `n` calls
    AtMost(usize),
    /// No constraint
    Any,
}

impl Times {
    /// Whether `count` calls meet this constraint
    pub fn allows(self, count: usize) -> bool {
        match self {
            Times::Once => count == 1,
            Times::Exactly(n) => count == n,
            Times::AtLeast(n) => count >= n,
            Times::AtMost(n) => count <= n,
            Times::Any => true,
        }
    }
}

/// A canned response
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl MockResponse {
    /// An empty `200 OK`
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header. Repeated names are appended, not replaced.
    ///
    /// Names or values that are not valid HTTP are dropped with a warning.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = key, "ignoring invalid mock header"),
        }
        self
    }

    /// Add a `Set-Cookie` header, e.g. `csrf_token=abc; Path=/; HttpOnly`
    pub fn set_cookie(self, cookie: &str) -> Self {
        self.header(SET_COOKIE.as_str(), cookie)
    }

    /// Set a raw body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and content type
    pub fn json(mut self, body: impl serde::Serialize) -> Self {
        match serde_json::to_vec(&body) {
            Ok(bytes) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = bytes.into();
            }
            Err(e) => tracing::warn!(error = %e, "mock body did not serialize"),
        }
        self
    }

    /// An error response in the server's `{"error": "..."}` shape
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new()
            .status(status)
            .json(serde_json::json!({ "error": message }))
    }
}
