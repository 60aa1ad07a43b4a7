//! Database error types for mh-db.

use mh_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The requested entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    /// An entity with the same identity already exists.
    #[error("{entity} '{id}' already exists")]
    AlreadyExists { entity: String, id: String },

    /// Input rejected by a value object.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller cancelled the unit of work; the transaction was rolled back.
    #[error("Save cancelled")]
    Cancelled,

    /// Invalid state encountered (e.g., entity not tracked, bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity: &str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound { entity_type, id } => Self::NotFound {
                entity: entity_type,
                id,
            },
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::UnknownVariant { .. } => Self::Query(error.to_string()),
            CoreError::Other(e) => Self::Other(e),
        }
    }
}
