//! Bearer token validation settings used to attribute changes.

use serde::{Deserialize, Serialize};

fn default_user_id_claim() -> String {
    "UserId".to_string()
}

/// What to do when a bearer token is present but carries no user id claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionPolicy {
    /// Reject the write.
    #[default]
    FailClosed,
    /// Log a warning and record the change without an author.
    Anonymous,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 shared secret used to verify bearer tokens.
    #[serde(default)]
    pub jwt_secret: String,

    /// Expected `iss` claim. Not checked when empty.
    #[serde(default)]
    pub issuer: String,

    /// Expected `aud` claim. Not checked when empty.
    #[serde(default)]
    pub audience: String,

    /// Claim holding the acting user's id.
    #[serde(default = "default_user_id_claim")]
    pub user_id_claim: String,

    #[serde(default)]
    pub attribution: AttributionPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: String::new(),
            audience: String::new(),
            user_id_claim: default_user_id_claim(),
            attribution: AttributionPolicy::default(),
        }
    }
}

impl AuthConfig {
    /// Check if a verification secret is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        Some(self.issuer.as_str()).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn audience(&self) -> Option<&str> {
        Some(self.audience.as_str()).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured_and_fails_closed() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.user_id_claim, "UserId");
        assert_eq!(config.attribution, AttributionPolicy::FailClosed);
        assert_eq!(config.issuer(), None);
        assert_eq!(config.audience(), None);
    }

    #[test]
    fn configured_when_secret_set() {
        let config = AuthConfig {
            jwt_secret: "s3cret".into(),
            issuer: "mhouse".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
        assert_eq!(config.issuer(), Some("mhouse"));
    }
}
