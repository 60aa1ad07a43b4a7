//! # mh-auth
//!
//! Reads the acting user out of a request's bearer token so that every
//! write can be attributed in the audit trail. Token issuance is handled
//! elsewhere; this crate only verifies.

pub mod claims;
pub mod error;
pub mod resolver;

pub use claims::MhClaims;
pub use error::AuthError;
pub use resolver::ActorResolver;
