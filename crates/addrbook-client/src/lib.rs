//! # addrbook-client
//!
//! Typed async client for the address-book API.
//!
//! Every call goes through a small middleware pipeline in front of the HTTP
//! transport. The built-in CSRF layer picks up anti-forgery tokens from
//! responses and sends the current one as `X-CSRF-Token` on protected routes,
//! so callers never handle tokens themselves.
//!
//! ## Modules
//!
//! - [`api`] - login, registration, logout, profile and address CRUD
//! - [`csrf`] - token store, route policy and the CSRF layer
//! - [`middleware`] - layer stack and request logging
//! - [`session`] - session check with observable state
//! - [`config`] - environment-driven configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use addrbook_client::{ApiClient, ClientConfig};
//!
//! # async fn run() -> addrbook_client::Result<()> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! client.auth().login("ada@example.com", "hunter22").await?;
//! for address in client.addresses().list().await? {
//!     println!("{}", address.one_line());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod client;
pub mod config;
pub mod cookies;
pub mod csrf;
pub mod error;
pub mod jar;
pub mod middleware;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::{load_dotenv, ClientConfig};
pub use error::{ClientError, ConfigError, Result};
pub use jar::BrowserCookieJar;
pub use request::ApiRequest;
pub use response::ApiResponse;
pub use session::{Navigation, ProfileFetcher, SessionMonitor, SessionState};
pub use transport::{ReqwestTransport, Transport};

/// Prelude module - import everything you need with `use addrbook_client::prelude::*`
pub mod prelude {
    pub use crate::api::{Address, AddressCreateRequest, AddressUpdate, SignupRequest, User};
    pub use crate::csrf::{CsrfConfig, CsrfLayer, MatchRule, TokenStore};
    pub use crate::middleware::{ClientLayer, LoggingLayer};
    pub use crate::{
        ApiClient, ClientConfig, ClientError, Navigation, Result, SessionMonitor, SessionState,
    };
}
