use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("bearer token supplied but no auth.jwt_secret is configured")]
    NotConfigured,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// The token verified but does not name the acting user.
    #[error("unable to determine change author: token has no '{claim}' claim")]
    MissingAuthorClaim { claim: String },
}
