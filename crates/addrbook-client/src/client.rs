//! The API client and its builder

use crate::config::ClientConfig;
use crate::csrf::{CsrfLayer, TokenStore};
use crate::error::{ClientError, Result};
use crate::jar::BrowserCookieJar;
use crate::middleware::{BoxedNext, ClientLayer, LayerStack, LoggingLayer};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::transport::{self, ReqwestTransport, Transport};
use http::Method;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Client for the address-book API.
///
/// Every call runs through the middleware stack (CSRF handling, logging,
/// anything added via the builder) before reaching the transport. Cloning is
/// cheap and clones share the token store and cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    store: TokenStore,
    jar: Option<Arc<BrowserCookieJar>>,
    layers: LayerStack,
    transport: BoxedNext,
}

impl ApiClient {
    /// Build a client with the default stack over `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Start configuring a client.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The token store shared by this client's CSRF layer.
    pub fn token_store(&self) -> &TokenStore {
        &self.inner.store
    }

    /// The cookie jar, when the client owns one.
    pub fn cookie_jar(&self) -> Option<&Arc<BrowserCookieJar>> {
        self.inner.jar.as_ref()
    }

    /// Prepare a request for `path` relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest> {
        let url = self
            .inner
            .config
            .resolve(path)
            .ok_or_else(|| ClientError::InvalidUrl {
                base: self.inner.config.base_url.clone(),
                path: path.to_string(),
            })?;
        Ok(ApiRequest::new(method, path, url))
    }

    /// Run a prepared request through the stack.
    ///
    /// Returns the response whatever its status.
    pub async fn execute(&self, req: ApiRequest) -> Result<ApiResponse> {
        self.inner
            .layers
            .execute(req, self.inner.transport.clone())
            .await
    }

    /// Send a request without a body.
    pub async fn send(&self, method: Method, path: &str) -> Result<ApiResponse> {
        let req = self.request(method, path)?;
        self.execute(req).await
    }

    /// Send a request with a JSON body.
    pub async fn send_json<B>(&self, method: Method, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(method, path)?.with_json(body)?;
        self.execute(req).await
    }

    /// `GET path`
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::GET, path).await
    }

    /// `DELETE path`
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(Method::DELETE, path).await
    }

    /// `POST path` with a JSON body
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send_json(Method::POST, path, body).await
    }

    /// `PATCH path` with a JSON body
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send_json(Method::PATCH, path, body).await
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("layers", &self.inner.layers.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    store: Option<TokenStore>,
    transport: Option<Arc<dyn Transport>>,
    extra: Vec<Box<dyn ClientLayer>>,
}

impl ApiClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            store: None,
            transport: None,
            extra: Vec::new(),
        }
    }

    /// Use an existing token store instead of one backed by the client's jar.
    pub fn token_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the network transport.
    pub fn transport(mut self, transport: impl Transport) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        self.transport = Some(transport);
        self
    }

    /// Add a layer inside the built-in ones (closest to the transport).
    pub fn layer(mut self, layer: impl ClientLayer) -> Self {
        self.extra.push(Box::new(layer));
        self
    }

    /// Validate the configuration and assemble the client.
    ///
    /// The CSRF layer is outermost, so logging and any extra layers see the
    /// request exactly as it will be sent.
    pub fn build(self) -> Result<ApiClient> {
        let config = self.config;
        config.validate()?;

        let (transport, jar): (Arc<dyn Transport>, Option<Arc<BrowserCookieJar>>) =
            match self.transport {
                Some(t) => (t, None),
                None => {
                    let jar = Arc::new(BrowserCookieJar::new());
                    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(jar.clone())?);
                    (transport, Some(jar))
                }
            };

        let store = match (self.store, &jar) {
            (Some(store), _) => store,
            (None, Some(jar)) => TokenStore::from_shared(jar.clone(), config.csrf_cookie.clone()),
            (None, None) => TokenStore::new(),
        };

        let mut layers = LayerStack::new();
        layers.push(Box::new(CsrfLayer::new(config.csrf(), store.clone())));
        if config.log_requests {
            layers.push(Box::new(
                LoggingLayer::new().redact_header(config.csrf_header.clone()),
            ));
        }
        for layer in self.extra {
            layers.push(layer);
        }

        tracing::debug!(base_url = %config.base_url, layers = layers.len(), "api client ready");

        Ok(ApiClient {
            inner: Arc::new(Inner {
                config,
                store,
                jar,
                layers,
                transport: transport::into_next(transport),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<(Method, String, HeaderMap)>>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, req: ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().unwrap().push((
                req.method().clone(),
                req.url().to_string(),
                req.headers().clone(),
            ));
            let mut headers = HeaderMap::new();
            headers.append(
                http::header::SET_COOKIE,
                "csrf_token=tok1; Path=/".parse().unwrap(),
            );
            Ok(ApiResponse::new(StatusCode::OK, headers, "{}"))
        }
    }

    #[tokio::test]
    async fn test_requests_resolve_against_base_url() {
        let recorder = Recorder::default();
        let client = ApiClient::builder(ClientConfig::new().base_url("http://api.test/api/"))
            .transport(recorder.clone())
            .build()
            .unwrap();

        client.get("/v1/users/addresses").await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].0, Method::GET);
        assert_eq!(seen[0].1, "http://api.test/api/v1/users/addresses");
    }

    #[tokio::test]
    async fn test_token_flows_between_calls() {
        let recorder = Recorder::default();
        let client = ApiClient::builder(ClientConfig::new())
            .transport(recorder.clone())
            .build()
            .unwrap();

        client.post("/login", &serde_json::json!({})).await.unwrap();
        client.delete("/v1/users/address/9").await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert!(seen[0].2.get("x-csrf-token").is_none());
        assert_eq!(seen[1].2["x-csrf-token"], "tok1");
    }

    #[tokio::test]
    async fn test_injected_store_is_used() {
        let store = TokenStore::new();
        store.set_from_body("preloaded");
        let recorder = Recorder::default();
        let client = ApiClient::builder(ClientConfig::new())
            .token_store(store.clone())
            .transport(recorder.clone())
            .build()
            .unwrap();

        client.get("/v1/users/addresses").await.unwrap();
        assert_eq!(recorder.seen.lock().unwrap()[0].2["x-csrf-token"], "preloaded");
        assert!(client.cookie_jar().is_none());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let err = ApiClient::builder(ClientConfig::new().base_url("nope"))
            .transport(Recorder::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_default_build_owns_jar() {
        let client = ApiClient::new(ClientConfig::new()).unwrap();
        assert!(client.cookie_jar().is_some());
        assert_eq!(client.config().base_url, "http://localhost:8080/api/");
    }
}
