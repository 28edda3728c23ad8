//! Test support for address-book API clients
//!
//! [`MockServer`] is a real HTTP server on a random local port. Register
//! expectations with [`RequestMatcher`] and [`MockResponse`], point a client
//! at [`MockServer::api_url`], then inspect what the client actually sent
//! with [`MockServer::received_requests`].
//!
//! The [`fixtures`] module has ready-made bodies shaped like the real API.

pub mod expectation;
pub mod fixtures;
pub mod matcher;
pub mod server;

pub use expectation::{Expectation, MockResponse, Times};
pub use matcher::RequestMatcher;
pub use server::{MockError, MockServer, RecordedRequest};
