use super::expectation::{Expectation, MockResponse, Times};
use super::matcher::RequestMatcher;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to bring up a [`MockServer`]
#[derive(Debug, Error)]
pub enum MockError {
    /// Binding or inspecting the listener failed
    #[error("mock server could not bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// A mock HTTP server
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct ServerState {
    expectations: Vec<Expectation>,
    received: Vec<RecordedRequest>,
    unmatched: Vec<RecordedRequest>,
}

fn lock(state: &Mutex<ServerState>) -> MutexGuard<'_, ServerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method
    pub method: http::Method,
    /// Path without query
    pub path: String,
    /// All request headers
    pub headers: http::HeaderMap,
    /// Raw body
    pub body: Bytes,
}

impl RecordedRequest {
    /// A header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body parsed as JSON
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

impl MockServer {
    /// Start a new mock server on a random port
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound; use [`try_start`](Self::try_start)
    /// to handle that case.
    pub async fn start() -> Self {
        match Self::try_start().await {
            Ok(server) => server,
            Err(e) => panic!("{}", e),
        }
    }

    /// Start a new mock server on a random port
    pub async fn try_start() -> Result<Self, MockError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(Mutex::new(ServerState::default()));

        let state_clone = state.clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut stop_future = shutdown_rx;

            loop {
                tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok((stream, _)) => {
                                let io = TokioIo::new(stream);
                                let state = state_clone.clone();

                                tokio::spawn(async move {
                                    if let Err(err) = hyper_util::server::conn::auto::Builder::new(hyper_util::rt::TokioExecutor::new())
                                        .serve_connection(io, service_fn(move |req| handle_request(req, state.clone())))
                                        .await
                                    {
                                        tracing::debug!(error = ?err, "mock connection ended with error");
                                    }
                                });
                            }
                            Err(e) => tracing::warn!(error = %e, "mock accept failed"),
                        }
                    }
                    _ = &mut stop_future => {
                        break;
                    }
                }
            }
        });

        tracing::debug!(%addr, "mock server listening");

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Origin of the server, e.g. `http://127.0.0.1:41234`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// API root the real server is mounted at, e.g. `http://127.0.0.1:41234/api/`
    pub fn api_url(&self) -> String {
        format!("{}/api/", self.base_url())
    }

    /// Every request received so far, in arrival order
    pub fn received_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).received.clone()
    }

    /// Received requests whose path equals `path`
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        lock(&self.state)
            .received
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Requests that didn't match any expectation
    pub fn unmatched_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).unmatched.clone()
    }

    /// Add an expectation
    ///
    /// Later expectations take priority over earlier ones, and an expectation
    /// with an upper bound stops matching once it has been used up. Together
    /// these allow scripting a sequence of answers for the same route.
    pub fn expect(&self, matcher: RequestMatcher) -> ExpectationBuilder {
        ExpectationBuilder {
            server: self.state.clone(),
            expectation: Some(Expectation::new(matcher)),
        }
    }

    /// Verify that all expectations were met
    ///
    /// # Panics
    ///
    /// Panics naming the first expectation whose call count is off.
    pub fn verify(&self) {
        let state = lock(&self.state);
        for exp in &state.expectations {
            assert!(
                exp.is_satisfied(),
                "Expectation {:?} expected {:?} calls, got {}",
                exp.matcher,
                exp.times,
                exp.call_count
            );
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Finishes an expectation; it is registered when dropped
pub struct ExpectationBuilder {
    server: Arc<Mutex<ServerState>>,
    expectation: Option<Expectation>,
}

impl ExpectationBuilder {
    fn with(mut self, f: impl FnOnce(&mut Expectation)) -> Self {
        if let Some(exp) = self.expectation.as_mut() {
            f(exp);
        }
        self
    }

    /// Answer matching requests with `response`
    pub fn respond_with(self, response: MockResponse) -> Self {
        self.with(|exp| exp.response = response)
    }

    /// Expect exactly `n` calls
    pub fn times(self, n: usize) -> Self {
        self.with(|exp| exp.times = Times::Exactly(n))
    }

    /// Expect exactly one call
    pub fn once(self) -> Self {
        self.with(|exp| exp.times = Times::Once)
    }

    /// Expect one or more calls
    pub fn at_least_once(self) -> Self {
        self.with(|exp| exp.times = Times::AtLeast(1))
    }

    /// Expect no calls
    pub fn never(self) -> Self {
        self.with(|exp| exp.times = Times::Exactly(0))
    }
}

impl Drop for ExpectationBuilder {
    fn drop(&mut self) {
        if let Some(exp) = self.expectation.take() {
            lock(&self.server).expectations.push(exp);
        }
    }
}

fn exhausted(exp: &Expectation) -> bool {
    match exp.times {
        Times::Once => exp.call_count >= 1,
        Times::Exactly(n) | Times::AtMost(n) => exp.call_count >= n,
        Times::AtLeast(_) | Times::Any => false,
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<Mutex<ServerState>>,
) -> Result<Response<Full<Bytes>>, GenericError> {
    let (parts, body) = req.into_parts();
    let body_bytes = body.collect().await?.to_bytes();

    let recorded = RecordedRequest {
        method: parts.method,
        path: parts.uri.path().to_string(),
        headers: parts.headers,
        body: body_bytes,
    };

    let mut state = lock(&state);
    state.received.push(recorded.clone());

    let matching_idx = state
        .expectations
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, exp)| !exhausted(exp))
        .find(|(_, exp)| {
            exp.matcher.matches(
                &recorded.method,
                &recorded.path,
                &recorded.headers,
                &recorded.body,
            )
        })
        .map(|(i, _)| i);

    match matching_idx {
        Some(idx) => {
            let exp = &mut state.expectations[idx];
            exp.call_count += 1;

            let resp_def = &exp.response;
            let mut response = Response::builder().status(resp_def.status);
            for (k, v) in &resp_def.headers {
                response = response.header(k, v);
            }
            Ok(response.body(Full::new(resp_def.body.clone()))?)
        }
        None => {
            tracing::debug!(method = %recorded.method, path = %recorded.path, "unmatched mock request");
            state.unmatched.push(recorded);
            Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from_static(
                    br#"{"error":"No expectation matched"}"#,
                )))?)
        }
    }
}
