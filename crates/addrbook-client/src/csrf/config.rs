use super::policy::{MatchRule, ProtectionPolicy};

/// Configuration for client-side CSRF token handling.
#[derive(Clone, Debug)]
pub struct CsrfConfig {
    /// The name of the header protected requests carry the token in.
    /// Default: "X-CSRF-Token"
    pub header_name: String,

    /// The name of the cookie the server delivers the token in.
    /// Default: "csrf_token"
    pub cookie_name: String,

    /// The JSON response field the server may deliver the token in.
    /// Default: "csrfToken"
    pub body_field: String,

    /// Path segment identifying protected routes.
    /// Default: "/v1/"
    pub protected_segment: String,

    /// How `protected_segment` is matched.
    /// Default: Substring
    pub match_rule: MatchRule,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header_name: "X-CSRF-Token".to_string(),
            cookie_name: "csrf_token".to_string(),
            body_field: "csrfToken".to_string(),
            protected_segment: "/v1/".to_string(),
            match_rule: MatchRule::Substring,
        }
    }
}

impl CsrfConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the header name.
    pub fn header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set the cookie name.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the response body field.
    pub fn body_field(mut self, field: impl Into<String>) -> Self {
        self.body_field = field.into();
        self
    }

    /// Set the protected path segment.
    pub fn protected_segment(mut self, segment: impl Into<String>) -> Self {
        self.protected_segment = segment.into();
        self
    }

    /// Set the match rule.
    pub fn match_rule(mut self, rule: MatchRule) -> Self {
        self.match_rule = rule;
        self
    }

    /// Route classification built from this configuration.
    pub fn policy(&self) -> ProtectionPolicy {
        ProtectionPolicy::new(self.protected_segment.clone(), self.match_rule)
    }
}
