//! JSON response types returned by history queries and `mh` commands.
//!
//! History responses use camelCase field names, matching what API clients
//! already consume.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AuditEntry, AuditRecord, House, HouseWeekInfo, Post, WeekMark};

/// One audit record as shown in a history listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub operation: String,
    pub table_name: String,
    pub record_id: String,
    pub changes: Vec<AuditEntryResponse>,
    pub change_date: DateTime<Utc>,
    pub change_author_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        Self {
            field_name: entry.field_name,
            old_value: entry.old_value,
            new_value: entry.new_value,
        }
    }
}

impl From<AuditRecord> for AuditResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            operation: record.operation.to_string(),
            table_name: record.table_name,
            record_id: record.record_id,
            changes: record.changes.into_iter().map(Into::into).collect(),
            change_date: record.change_date,
            change_author_id: record.change_author_id,
        }
    }
}

/// Response from `mh house get`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct HouseDetailResponse {
    pub house: House,
    pub posts: Vec<Post>,
    pub weeks: Vec<HouseWeekInfo>,
}

/// Response from `mh week get`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WeekDetailResponse {
    pub week: HouseWeekInfo,
    pub marks: Vec<WeekMark>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::enums::AuditOperation;

    #[test]
    fn audit_response_uses_camel_case() {
        let record = AuditRecord {
            id: "aud-0011223344556677".into(),
            operation: AuditOperation::Update,
            table_name: "Houses".into(),
            record_id: "H1".into(),
            change_date: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            change_author_id: Some("u-1".into()),
            changes: vec![AuditEntry::new(
                "Brigade",
                Some("Alpha".into()),
                Some("Beta".into()),
            )],
        };

        let json = serde_json::to_value(AuditResponse::from(record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "operation": "Update",
                "tableName": "Houses",
                "recordId": "H1",
                "changes": [
                    { "fieldName": "Brigade", "oldValue": "Alpha", "newValue": "Beta" }
                ],
                "changeDate": "2024-05-01T10:00:00Z",
                "changeAuthorId": "u-1"
            })
        );
    }
}
