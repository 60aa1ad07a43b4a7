//! Cross-cutting error types for mhouse.
//!
//! Storage-specific errors (`DatabaseError`) and identity errors (`AuthError`)
//! live in their own crates. A unified error is left to `mh-cli`, where all
//! crate errors converge into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any mhouse crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (value object constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored or supplied string does not name a known enum variant.
    #[error("Unknown {kind} value: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
