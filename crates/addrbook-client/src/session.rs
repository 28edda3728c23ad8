//! Session check
//!
//! Whether the user is signed in is only known after asking the server. A
//! [`SessionMonitor`] starts out [`SessionState::Unknown`], and every
//! [`check`](SessionMonitor::check) calls the profile endpoint again; nothing
//! is cached between checks.

use crate::api::User;
use crate::client::ApiClient;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Outcome of the most recent session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No check has completed yet
    #[default]
    Unknown,
    /// The profile endpoint answered successfully
    Authenticated,
    /// The profile endpoint failed for any reason
    Unauthenticated,
}

/// Where a front end should send the user for a given session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Show a neutral loading view and do not navigate.
    Loading,
    /// Protected home view
    Home,
    /// Login view
    Login,
}

impl From<SessionState> for Navigation {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Unknown => Navigation::Loading,
            SessionState::Authenticated => Navigation::Home,
            SessionState::Unauthenticated => Navigation::Login,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Unknown => "unknown",
            SessionState::Authenticated => "authenticated",
            SessionState::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

/// Source of the current user's profile.
#[async_trait]
pub trait ProfileFetcher: Send + Sync + 'static {
    /// Ask the server who is signed in.
    async fn fetch_profile(&self) -> Result<User>;
}

#[async_trait]
impl ProfileFetcher for ApiClient {
    async fn fetch_profile(&self) -> Result<User> {
        self.auth().profile().await
    }
}

/// Tracks the session state and publishes changes to subscribers.
#[derive(Clone)]
pub struct SessionMonitor {
    fetcher: Arc<dyn ProfileFetcher>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionMonitor {
    /// Create a monitor in the [`SessionState::Unknown`] state.
    pub fn new(fetcher: impl ProfileFetcher) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(state),
        }
    }

    /// The latest state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Where the user should be right now.
    pub fn navigation(&self) -> Navigation {
        self.state().into()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Query the profile endpoint and update the state.
    ///
    /// Any failure, whatever its cause, means unauthenticated.
    pub async fn check(&self) -> SessionState {
        let next = match self.fetcher.fetch_profile().await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "session active");
                SessionState::Authenticated
            }
            Err(_) => SessionState::Unauthenticated,
        };
        self.state.send_replace(next);
        next
    }
}

impl fmt::Debug for SessionMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionMonitor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
