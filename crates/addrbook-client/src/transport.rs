//! The network end of the client pipeline

use crate::error::Result;
use crate::jar::BrowserCookieJar;
use crate::middleware::{BoxedNext, ResponseFuture};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends a fully prepared request and returns whatever the server answered.
///
/// Every completed exchange is an `Ok`, whatever its status; only failures
/// to get a response at all are errors.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Perform the exchange.
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse>;
}

/// Adapt a transport into the final link of a middleware chain.
pub fn into_next<T: Transport + ?Sized>(transport: Arc<T>) -> BoxedNext {
    Arc::new(move |req: ApiRequest| {
        let transport = transport.clone();
        Box::pin(async move { transport.send(req).await }) as ResponseFuture
    })
}

/// [`Transport`] backed by `reqwest`, sending the jar's cookies with every
/// request and storing every cookie the server sets.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client around a shared cookie jar.
    pub fn new(jar: Arc<BrowserCookieJar>) -> Result<Self> {
        let client = reqwest::Client::builder().cookie_provider(jar).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, req: ApiRequest) -> Result<ApiResponse> {
        let (method, url, headers, body) = req.into_parts();

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(ApiResponse::new(status, headers, body))
    }
}
