//! CSRF token handling for outgoing requests.
//!
//! The server hands out an anti-forgery token in one of three ways: a
//! `csrfToken` field in a JSON body, a cookie readable from the client's
//! cookie store, or a raw `Set-Cookie` header. [`CsrfLayer`] harvests tokens
//! from every response into a [`TokenStore`] and attaches the current token
//! as `X-CSRF-Token` to every request whose path marks it as protected.
//!
//! # Example
//!
//! ```rust,no_run
//! use addrbook_client::csrf::{CsrfConfig, CsrfLayer, TokenStore};
//!
//! let store = TokenStore::new();
//! let layer = CsrfLayer::new(
//!     CsrfConfig::new().header_name("X-CSRF-Token"),
//!     store.clone(),
//! );
//! ```

mod config;
mod layer;
mod policy;
mod token;

pub use config::CsrfConfig;
pub use layer::{attach_token, harvest_token, CsrfLayer};
pub use policy::{MatchRule, ProtectionPolicy};
pub use token::{CookieSource, CsrfToken, NoCookies, TokenSnapshot, TokenSource, TokenStore};
