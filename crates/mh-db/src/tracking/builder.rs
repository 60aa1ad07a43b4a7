//! Audit record building.
//!
//! Runs after the primary write so generated keys are already assigned.

use chrono::{DateTime, Utc};
use mh_core::entities::AuditEntry;
use mh_core::enums::AuditOperation;
use mh_core::identity::Actor;
use mh_core::ids::UNKNOWN_KEY;

use super::snapshot::ChangeSnapshot;
use super::tracker::ChangeTracker;

/// An audit record ready to insert; the id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub operation: AuditOperation,
    pub table_name: &'static str,
    pub record_id: String,
    pub change_date: DateTime<Utc>,
    pub change_author_id: Option<String>,
    pub changes: Vec<AuditEntry>,
}

/// Complete one snapshot with its key, table name, timestamp and author.
///
/// An entity whose key cannot be read is recorded under `UnknownKey`.
#[must_use]
pub fn build_record(
    snapshot: &ChangeSnapshot,
    tracker: &ChangeTracker,
    change_date: DateTime<Utc>,
    actor: &Actor,
) -> NewAuditRecord {
    let record_id = tracker
        .entry(snapshot.entry)
        .and_then(|entry| entry.entity().key())
        .and_then(|key| key.to_audit_string())
        .unwrap_or_else(|| UNKNOWN_KEY.to_string());

    NewAuditRecord {
        operation: snapshot.operation,
        table_name: snapshot.kind.table_name(),
        record_id,
        change_date,
        change_author_id: actor.author_id.clone(),
        changes: snapshot.changes.clone(),
    }
}

#[must_use]
pub fn build_records(
    snapshots: &[ChangeSnapshot],
    tracker: &ChangeTracker,
    change_date: DateTime<Utc>,
    actor: &Actor,
) -> Vec<NewAuditRecord> {
    snapshots
        .iter()
        .map(|snapshot| build_record(snapshot, tracker, change_date, actor))
        .collect()
}

#[cfg(test)]
mod tests {
    use mh_core::entities::{Post, WeekMark};
    use mh_core::enums::MarkType;
    use mh_core::ids::{HouseWeekInfoId, PostId};
    use mh_core::values::{MarkComment, PostName};

    use super::*;
    use crate::tracking::snapshot::extract;

    #[test]
    fn key_is_read_at_build_time() {
        let mut uow = ChangeTracker::new();
        let id = uow.add(Post::new(PostName::new("North").unwrap(), 2.0));
        let snaps = extract(&mut uow);

        // simulates the primary write assigning the key
        uow.entity_mut::<Post>(id).unwrap().id = Some(PostId(41));

        let now = Utc::now();
        let record = build_record(&snaps[0], &uow, now, &Actor::user("u-1"));
        assert_eq!(record.record_id, "41");
        assert_eq!(record.table_name, "Posts");
        assert_eq!(record.operation, AuditOperation::Create);
        assert_eq!(record.change_date, now);
        assert_eq!(record.change_author_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn unresolvable_key_falls_back_to_sentinel() {
        let mut uow = ChangeTracker::new();
        uow.add(WeekMark::new(
            HouseWeekInfoId(1),
            MarkType::RedMark,
            MarkComment::new("leak").unwrap(),
        ));
        let snaps = extract(&mut uow);

        let records = build_records(&snaps, &uow, Utc::now(), &Actor::system());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_id, UNKNOWN_KEY);
        assert_eq!(records[0].table_name, "WeekMarks");
        assert_eq!(records[0].change_author_id, None);
    }
}
