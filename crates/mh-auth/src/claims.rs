use mh_core::identity::Actor;
use serde_json::Value;

/// Verified claims relevant to change attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MhClaims {
    /// Value of the configured user id claim, if present and non-empty.
    pub user_id: Option<String>,
}

impl MhClaims {
    /// Pick the attribution fields out of a decoded claim set.
    ///
    /// Numeric user ids are accepted and rendered as strings.
    #[must_use]
    pub fn from_value(claims: &Value, user_id_claim: &str) -> Self {
        let user_id = match claims.get(user_id_claim) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self { user_id }
    }

    #[must_use]
    pub fn to_actor(&self) -> Option<Actor> {
        self.user_id.as_deref().map(Actor::user)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_string_claim() {
        let claims = MhClaims::from_value(&json!({ "UserId": " u-1 ", "exp": 1_900_000_000 }), "UserId");
        assert_eq!(claims.user_id.as_deref(), Some("u-1"));
        assert_eq!(claims.to_actor(), Some(Actor::user("u-1")));
    }

    #[test]
    fn numeric_claim_is_rendered() {
        let claims = MhClaims::from_value(&json!({ "UserId": 42 }), "UserId");
        assert_eq!(claims.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn blank_or_missing_claim_is_none() {
        assert_eq!(MhClaims::from_value(&json!({ "UserId": "  " }), "UserId").user_id, None);
        assert_eq!(MhClaims::from_value(&json!({ "sub": "u-1" }), "UserId").user_id, None);
        assert_eq!(MhClaims::from_value(&json!({ "UserId": true }), "UserId").to_actor(), None);
    }
}
