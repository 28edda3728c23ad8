use super::config::CsrfConfig;
use super::policy::ProtectionPolicy;
use super::token::TokenStore;
use crate::cookies;
use crate::middleware::{BoxedNext, ClientLayer, ResponseFuture};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use std::sync::Arc;

/// Annotate a protected request with the current CSRF token.
///
/// Public requests come back untouched. Protected requests get
/// `config.header_name` set when the store knows a token and are otherwise
/// sent without it; the server decides what a missing token means.
pub fn attach_token(
    store: &TokenStore,
    policy: &ProtectionPolicy,
    config: &CsrfConfig,
    mut req: ApiRequest,
) -> ApiRequest {
    if !policy.is_protected(req.path()) {
        return req;
    }

    match store.resolve(req.url()) {
        Some((token, source)) => {
            if let Err(e) = req.set_header(&config.header_name, token.as_str()) {
                tracing::warn!(error = %e, "csrf token not attached");
            } else {
                tracing::trace!(path = %req.path(), ?source, "csrf token attached");
            }
        }
        None => {
            tracing::debug!(path = %req.path(), "no csrf token known, sending without header");
        }
    }
    req
}

/// Record any CSRF token a response delivers.
///
/// A string `body_field` in a JSON body goes to the body slot; the first
/// `cookie_name=<value>` among the `Set-Cookie` headers goes to the header
/// slot. Both are checked independently. Anything malformed is ignored.
pub fn harvest_token(store: &TokenStore, config: &CsrfConfig, resp: &ApiResponse) {
    if let Some(token) = resp
        .json_value()
        .as_ref()
        .and_then(|body| body.get(&config.body_field))
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
    {
        store.set_from_body(token);
    }

    if let Some(token) = cookies::token_from_set_cookie(resp.set_cookies(), &config.cookie_name) {
        store.set_from_cookie_header(token);
    }
}

/// Client middleware attaching and harvesting CSRF tokens.
#[derive(Clone, Debug)]
pub struct CsrfLayer {
    config: Arc<CsrfConfig>,
    policy: Arc<ProtectionPolicy>,
    store: TokenStore,
}

impl CsrfLayer {
    /// Create a new CSRF layer backed by `store`.
    pub fn new(config: CsrfConfig, store: TokenStore) -> Self {
        Self {
            policy: Arc::new(config.policy()),
            config: Arc::new(config),
            store,
        }
    }

    /// The store this layer reads and writes.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }
}

impl ClientLayer for CsrfLayer {
    fn call(&self, req: ApiRequest, next: BoxedNext) -> ResponseFuture {
        let layer = self.clone();

        Box::pin(async move {
            let req = attach_token(&layer.store, &layer.policy, &layer.config, req);

            // Transport errors go straight back to the caller.
            let resp = next(req).await?;

            harvest_token(&layer.store, &layer.config, &resp);
            Ok(resp)
        })
    }

    fn clone_box(&self) -> Box<dyn ClientLayer> {
        Box::new(self.clone())
    }
}
