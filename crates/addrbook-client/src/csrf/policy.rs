use serde::Deserialize;

/// How the protected segment is matched against a request path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// The path must start with the segment (`/v1/users` but not `/api/v1/users`).
    Prefix,
    /// The segment may appear anywhere in the path.
    #[default]
    Substring,
}

/// Classifies request paths as protected (token required) or public.
///
/// Paths are the ones handed to the client, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtectionPolicy {
    segment: String,
    rule: MatchRule,
}

impl ProtectionPolicy {
    /// Create a policy for `segment` (e.g. `/v1/`).
    pub fn new(segment: impl Into<String>, rule: MatchRule) -> Self {
        Self {
            segment: segment.into(),
            rule,
        }
    }

    /// The configured segment.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The configured rule.
    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    /// Whether requests to `path` must carry the CSRF header.
    pub fn is_protected(&self, path: &str) -> bool {
        match self.rule {
            MatchRule::Prefix => path.starts_with(&self.segment),
            MatchRule::Substring => path.contains(&self.segment),
        }
    }
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self::new("/v1/", MatchRule::Substring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_public_routes() {
        let policy = ProtectionPolicy::default();
        assert!(!policy.is_protected("/login"));
        assert!(!policy.is_protected("/register"));
        assert!(!policy.is_protected("/api/profile"));
        assert!(!policy.is_protected("/v1"));
    }

    #[test]
    fn test_protected_routes() {
        let policy = ProtectionPolicy::default();
        assert!(policy.is_protected("/v1/logout"));
        assert!(policy.is_protected("/v1/users/addresses"));
        assert!(policy.is_protected("/v1/users/address/7"));
    }

    #[test]
    fn test_prefix_and_substring_differ_on_nested_segment() {
        let prefix = ProtectionPolicy::new("/v1/", MatchRule::Prefix);
        let substring = ProtectionPolicy::new("/v1/", MatchRule::Substring);
        assert!(!prefix.is_protected("/api/v1/users"));
        assert!(substring.is_protected("/api/v1/users"));
        assert!(prefix.is_protected("/v1/users"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Anything under the segment is protected under both rules.
        #[test]
        fn prop_segment_prefixed_paths_protected(rest in "[a-z0-9/]{0,30}") {
            let path = format!("/v1/{}", rest);
            prop_assert!(ProtectionPolicy::new("/v1/", MatchRule::Prefix).is_protected(&path));
            prop_assert!(ProtectionPolicy::new("/v1/", MatchRule::Substring).is_protected(&path));
        }

        /// Paths never containing the segment are public under both rules.
        #[test]
        fn prop_paths_without_segment_public(path in "/[a-z/]{0,30}") {
            prop_assert!(!ProtectionPolicy::new("/v1/", MatchRule::Prefix).is_protected(&path));
            prop_assert!(!ProtectionPolicy::new("/v1/", MatchRule::Substring).is_protected(&path));
        }
    }
}
