use reqwest::Url;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A CSRF token as issued by the server.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Create a token from an existing string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"***").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Script-readable cookie storage.
///
/// Read live on every lookup; implementations must only return cookies a
/// page script could see for `url` (matching domain and path, not `HttpOnly`).
pub trait CookieSource: Send + Sync + 'static {
    /// Value of the cookie `name` visible for `url`, if any.
    fn cookie(&self, url: &Url, name: &str) -> Option<String>;
}

/// A cookie source that never yields anything, as in a cross-site context
/// where the API's cookies are not readable.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCookies;

impl CookieSource for NoCookies {
    fn cookie(&self, _url: &Url, _name: &str) -> Option<String> {
        None
    }
}

/// Where the token used for a request came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSource {
    /// A `csrfToken` field in a JSON response body.
    ResponseBody,
    /// The readable cookie store, at lookup time.
    CookieStore,
    /// A raw `Set-Cookie` response header.
    SetCookieHeader,
}

#[derive(Default)]
struct Slots {
    from_body: Option<CsrfToken>,
    from_set_cookie: Option<CsrfToken>,
}

/// Point-in-time copy of the store's slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenSnapshot {
    /// Last token seen in a response body.
    pub from_body: Option<CsrfToken>,
    /// Last token seen in a `Set-Cookie` header.
    pub from_set_cookie: Option<CsrfToken>,
}

/// In-memory holder of the most recently observed CSRF tokens.
///
/// Cloning shares state. Each source has one slot; a new value from the same
/// source replaces the old one. Nothing ever clears the slots, so the store
/// lives as long as the client that owns it.
#[derive(Clone)]
pub struct TokenStore {
    slots: Arc<RwLock<Slots>>,
    cookies: Option<CookieLookup>,
}

#[derive(Clone)]
struct CookieLookup {
    source: Arc<dyn CookieSource>,
    name: Arc<str>,
}

impl TokenStore {
    /// Create an empty store that never consults a cookie store.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(RwLock::new(Slots::default())),
            cookies: None,
        }
    }

    /// Create an empty store that consults `cookies` for `cookie_name`.
    pub fn with_cookie_source(cookies: impl CookieSource, cookie_name: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(cookies), cookie_name)
    }

    /// Like [`with_cookie_source`](Self::with_cookie_source) for an already shared source.
    pub fn from_shared(cookies: Arc<dyn CookieSource>, cookie_name: impl Into<String>) -> Self {
        let name: String = cookie_name.into();
        Self {
            cookies: Some(CookieLookup {
                source: cookies,
                name: Arc::from(name),
            }),
            ..Self::new()
        }
    }

    /// Record a token delivered in a response body.
    pub fn set_from_body(&self, token: impl Into<String>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.from_body = Some(CsrfToken::new(token));
        tracing::debug!(source = "body", "csrf token updated");
    }

    /// Record a token parsed from a `Set-Cookie` header.
    pub fn set_from_cookie_header(&self, token: impl Into<String>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.from_set_cookie = Some(CsrfToken::new(token));
        tracing::debug!(source = "set-cookie", "csrf token updated");
    }

    /// The token to send to `url`, if any.
    ///
    /// Priority: body slot, then the live cookie store, then the
    /// `Set-Cookie` slot.
    pub fn current_token(&self, url: &Url) -> Option<CsrfToken> {
        self.resolve(url).map(|(token, _)| token)
    }

    /// Like [`current_token`](Self::current_token), also reporting the source.
    pub fn resolve(&self, url: &Url) -> Option<(CsrfToken, TokenSource)> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = &slots.from_body {
            return Some((token.clone(), TokenSource::ResponseBody));
        }
        if let Some(value) = self
            .cookies
            .as_ref()
            .and_then(|c| c.source.cookie(url, &c.name))
            .filter(|v| !v.is_empty())
        {
            return Some((CsrfToken::new(value), TokenSource::CookieStore));
        }
        slots
            .from_set_cookie
            .clone()
            .map(|token| (token, TokenSource::SetCookieHeader))
    }

    /// Copy of both slots.
    pub fn snapshot(&self) -> TokenSnapshot {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        TokenSnapshot {
            from_body: slots.from_body.clone(),
            from_set_cookie: slots.from_set_cookie.clone(),
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("slots", &self.snapshot())
            .field("cookie_name", &self.cookies.as_ref().map(|c| &*c.name))
            .finish_non_exhaustive()
    }
}
