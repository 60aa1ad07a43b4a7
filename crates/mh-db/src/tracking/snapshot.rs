//! Change snapshot extraction.
//!
//! Runs before the primary write, while original values are still known.
//! Only tracker states change here; entities are never touched.

use mh_core::entities::AuditEntry;
use mh_core::enums::AuditOperation;

use super::tracker::{ChangeTracker, EntityState, EntryId, TrackedEntry};
use super::EntityKind;

/// Pending change of one tracked entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSnapshot {
    pub entry: EntryId,
    pub kind: EntityKind,
    pub operation: AuditOperation,
    /// Field diffs; empty unless `operation` is `Update`.
    pub changes: Vec<AuditEntry>,
}

/// Detect changes and snapshot every entry that will be written.
///
/// Added entries become `Create`, modified `Update` and deleted `Delete`;
/// unchanged and detached entries are skipped. Snapshots keep tracker order.
pub fn extract(tracker: &mut ChangeTracker) -> Vec<ChangeSnapshot> {
    tracker.detect_changes();
    tracker
        .entries()
        .filter_map(|(id, entry)| {
            let operation = match entry.state() {
                EntityState::Added => AuditOperation::Create,
                EntityState::Modified => AuditOperation::Update,
                EntityState::Deleted => AuditOperation::Delete,
                EntityState::Unchanged | EntityState::Detached => return None,
            };
            let changes = if operation == AuditOperation::Update {
                diff(entry)
            } else {
                Vec::new()
            };
            Some(ChangeSnapshot {
                entry: id,
                kind: entry.entity().kind(),
                operation,
                changes,
            })
        })
        .collect()
}

/// Field-level diff of a modified entry, in property declaration order.
fn diff(entry: &TrackedEntry) -> Vec<AuditEntry> {
    let meta = entry.entity().meta();
    let current = entry.entity().values();
    meta.properties
        .iter()
        .zip(current.iter().zip(entry.original_values()))
        .enumerate()
        .filter(|(i, (_, (now, before)))| entry.is_property_modified(*i) && now != before)
        .map(|(_, (prop, (now, before)))| {
            AuditEntry::new(prop.name, before.to_audit_string(), now.to_audit_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mh_core::entities::{House, Post};
    use mh_core::enums::HouseStatus;
    use mh_core::ids::{HouseId, PostId};
    use mh_core::values::{Brigade, DateSpan, HouseMetrics, Point, PostName};
    use pretty_assertions::assert_eq;

    use super::*;

    fn house() -> House {
        House::new(
            HouseId::new("H1"),
            HouseMetrics::new(10.0, 8.0).unwrap(),
            Point::new(-5, 5),
            HouseStatus::Planned,
            DateSpan::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), None).unwrap(),
            Brigade::new("TestBrigade").unwrap(),
        )
    }

    #[test]
    fn added_entity_is_create_without_diffs() {
        let mut uow = ChangeTracker::new();
        uow.add(house());
        let snaps = extract(&mut uow);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].operation, AuditOperation::Create);
        assert_eq!(snaps[0].kind, EntityKind::House);
        assert!(snaps[0].changes.is_empty());
    }

    #[test]
    fn unchanged_entity_is_skipped() {
        let mut uow = ChangeTracker::new();
        uow.attach(house());
        assert!(extract(&mut uow).is_empty());
    }

    #[test]
    fn update_lists_only_changed_fields() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(house());
        {
            let h = uow.entity_mut::<House>(id).unwrap();
            h.change_position(Point::new(10, 15));
            h.change_brigade(Brigade::new("UpdatedBrigade").unwrap());
        }

        let snaps = extract(&mut uow);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].operation, AuditOperation::Update);
        assert_eq!(
            snaps[0].changes,
            vec![
                AuditEntry::new("TopLeftCornerX", Some("-5".into()), Some("10".into())),
                AuditEntry::new("TopLeftCornerY", Some("5".into()), Some("15".into())),
                AuditEntry::new(
                    "Brigade",
                    Some("TestBrigade".into()),
                    Some("UpdatedBrigade".into())
                ),
            ]
        );
    }

    #[test]
    fn null_transitions_render_as_none() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(house());
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        uow.entity_mut::<House>(id)
            .unwrap()
            .change_real_terms(Some(DateSpan::new(start, None).unwrap()));

        let snaps = extract(&mut uow);
        assert_eq!(
            snaps[0].changes,
            vec![AuditEntry::new(
                "RealStartDate",
                None,
                Some("2024-04-01".into())
            )]
        );
    }

    #[test]
    fn forced_update_with_same_values_has_no_entries() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(house());
        uow.mark_modified(id).unwrap();
        let snaps = extract(&mut uow);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].operation, AuditOperation::Update);
        assert!(snaps[0].changes.is_empty());
    }

    #[test]
    fn deleted_entity_is_delete_without_diffs() {
        let mut uow = ChangeTracker::new();
        let mut post = Post::new(PostName::new("North").unwrap(), 3.0);
        post.id = Some(PostId(8));
        let id = uow.attach(post);
        uow.entity_mut::<Post>(id).unwrap().change_area(4.0);
        uow.remove(id).unwrap();

        let snaps = extract(&mut uow);
        assert_eq!(snaps[0].operation, AuditOperation::Delete);
        assert!(snaps[0].changes.is_empty());
    }
}
