use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AuditOperation;

/// One create, update or delete of one entity, written in the same
/// transaction as the change itself. Never updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: String,
    pub operation: AuditOperation,
    /// Logical collection name, e.g. `Houses`.
    pub table_name: String,
    /// Primary key of the changed entity, or `UnknownKey`.
    pub record_id: String,
    pub change_date: DateTime<Utc>,
    pub change_author_id: Option<String>,
    /// Field diffs. Only updates carry entries.
    pub changes: Vec<AuditEntry>,
}

/// Old and new value of one changed field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditEntry {
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl AuditEntry {
    #[must_use]
    pub fn new(
        field_name: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            old_value,
            new_value,
        }
    }
}
