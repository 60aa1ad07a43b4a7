//! Resolves the acting user from an `Authorization` header value.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use mh_config::{AttributionPolicy, AuthConfig};
use mh_core::identity::Actor;
use serde_json::Value;

use crate::claims::MhClaims;
use crate::error::AuthError;

/// Turns bearer tokens into [`Actor`]s.
///
/// Requests without a bearer token are system changes. A bearer token must
/// verify (HS256, `exp` required, optional issuer and audience) and must
/// carry the configured user id claim; what happens when the claim is
/// missing is decided by [`AttributionPolicy`].
pub struct ActorResolver {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
    user_id_claim: String,
    policy: AttributionPolicy,
}

impl std::fmt::Debug for ActorResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorResolver")
            .field("algorithm", &"HS256")
            .field("configured", &self.decoding_key.is_some())
            .field("user_id_claim", &self.user_id_claim)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ActorResolver {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let decoding_key = config
            .is_configured()
            .then(|| DecodingKey::from_secret(config.jwt_secret.as_bytes()));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        if let Some(iss) = config.issuer() {
            validation.set_issuer(&[iss]);
        }
        match config.audience() {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key,
            validation,
            user_id_claim: config.user_id_claim.clone(),
            policy: config.attribution,
        }
    }

    /// Resolve the actor behind an optional `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `AuthError::NotConfigured` if a bearer token is present but no secret is set.
    /// - `AuthError::TokenExpired` / `AuthError::TokenInvalid` if verification fails.
    /// - `AuthError::MissingAuthorClaim` if the claim is absent under
    ///   [`AttributionPolicy::FailClosed`].
    pub fn resolve(&self, authorization: Option<&str>) -> Result<Actor, AuthError> {
        let Some(token) = authorization.and_then(bearer_token) else {
            tracing::debug!("no bearer token, attributing change to system");
            return Ok(Actor::system());
        };

        let claims = self.verify(token)?;
        if let Some(actor) = claims.to_actor() {
            return Ok(actor);
        }

        match self.policy {
            AttributionPolicy::FailClosed => Err(AuthError::MissingAuthorClaim {
                claim: self.user_id_claim.clone(),
            }),
            AttributionPolicy::Anonymous => {
                tracing::warn!(
                    claim = %self.user_id_claim,
                    "bearer token has no user id claim, recording change without author"
                );
                Ok(Actor::system())
            }
        }
    }

    fn verify(&self, token: &str) -> Result<MhClaims, AuthError> {
        let key = self.decoding_key.as_ref().ok_or(AuthError::NotConfigured)?;
        if token.is_empty() {
            return Err(AuthError::TokenInvalid("empty bearer token".into()));
        }

        let data = jsonwebtoken::decode::<Value>(token, key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            }
        })?;

        Ok(MhClaims::from_value(&data.claims, &self.user_id_claim))
    }
}

/// Token part of a `Bearer`/`bearer` header, `None` for other schemes.
fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    ["Bearer", "bearer"]
        .iter()
        .find_map(|scheme| header.strip_prefix(scheme))
        .filter(|rest| rest.is_empty() || rest.starts_with(' '))
        .map(str::trim)
}
