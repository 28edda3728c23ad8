//! Shared cookie jar with a script-readable view.
//!
//! [`BrowserCookieJar`] is installed as the HTTP client's cookie provider, so
//! every request carries the session's cookies automatically. The same jar
//! doubles as the [`CookieSource`] consulted by the token store: it only
//! exposes cookies matching the request URL and hides cookies set `HttpOnly`,
//! mirroring what page script can read.

use crate::cookies;
use crate::csrf::CookieSource;
use http::HeaderValue;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Identity of a stored cookie: a later cookie with the same name, domain
/// and path replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CookieKey {
    name: String,
    domain: String,
    path: String,
}

#[derive(Debug, Clone)]
struct Scope {
    value: String,
    host_only: bool,
    http_only: bool,
}

/// Cookie jar shared between the transport and the token store.
#[derive(Debug, Default)]
pub struct BrowserCookieJar {
    jar: Jar,
    scopes: RwLock<HashMap<CookieKey, Scope>>,
}

impl BrowserCookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cookie as if `url` had answered with `Set-Cookie: cookie`.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        self.note_scope(cookie, url);
        self.jar.add_cookie_str(cookie, url);
    }

    fn note_scope(&self, set_cookie: &str, url: &Url) {
        let (Some(parsed), Some(host)) = (cookies::parse_set_cookie(set_cookie), url.host_str())
        else {
            return;
        };
        let (domain, host_only) = match parsed.domain {
            Some(domain) => (domain.to_ascii_lowercase(), false),
            None => (host.to_ascii_lowercase(), true),
        };
        let key = CookieKey {
            name: parsed.name.to_string(),
            domain,
            path: parsed
                .path
                .map_or_else(|| default_path(url.path()), str::to_string),
        };
        let scope = Scope {
            value: parsed.value.to_string(),
            host_only,
            http_only: parsed.http_only,
        };
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, scope);
    }

    /// Whether a `name=value` pair the jar sends to `url` is visible to script.
    ///
    /// Pairs the jar knows nothing about count as readable. When several
    /// stored cookies carry the same value, one readable copy is enough.
    fn readable(&self, url: &Url, name: &str, value: &str) -> bool {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let scopes = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
        let mut matching = scopes
            .iter()
            .filter(|(key, scope)| {
                key.name == name
                    && scope.value == value
                    && domain_matches(&host, &key.domain, scope.host_only)
                    && path_matches(url.path(), &key.path)
            })
            .peekable();
        matching.peek().is_none() || matching.any(|(_, scope)| !scope.http_only)
    }
}

/// Directory of the request path, used when `Set-Cookie` has no `Path`.
fn default_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

fn domain_matches(host: &str, domain: &str, host_only: bool) -> bool {
    if host_only {
        return host == domain;
    }
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    match request_path.strip_prefix(cookie_path) {
        Some(rest) => rest.is_empty() || cookie_path.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

impl CookieStore for BrowserCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let headers: Vec<&HeaderValue> = cookie_headers.collect();
        for value in &headers {
            if let Ok(s) = value.to_str() {
                self.note_scope(s, url);
            }
        }
        self.jar.set_cookies(&mut headers.into_iter(), url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.jar.cookies(url)
    }
}

impl CookieSource for BrowserCookieJar {
    fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let header = header.to_str().ok()?;
        let found = cookies::pairs(header)
            .filter(|(n, v)| *n == name && !v.is_empty())
            .find(|(_, v)| self.readable(url, name, v))
            .map(|(_, v)| v.to_string());
        found
    }
}
