//! The unit of work: tracked entities with their state and original values.

use crate::error::DatabaseError;

use super::{Entity, FieldValue, TrackedEntity};

/// Handle to one entry in a [`ChangeTracker`]. Stable for the tracker's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    /// No longer tracked (removed before save, or deleted and saved).
    Detached,
    Unchanged,
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct TrackedEntry {
    entity: TrackedEntity,
    state: EntityState,
    original_key: Option<FieldValue>,
    original: Vec<FieldValue>,
    modified: Vec<bool>,
    forced: bool,
}

impl TrackedEntry {
    fn new(entity: TrackedEntity, state: EntityState) -> Self {
        let original_key = entity.key();
        let original = entity.values();
        let modified = vec![false; original.len()];
        Self {
            entity,
            state,
            original_key,
            original,
            modified,
            forced: false,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &TrackedEntity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut TrackedEntity {
        &mut self.entity
    }

    #[must_use]
    pub const fn state(&self) -> EntityState {
        self.state
    }

    /// Key as of attach or the last successful save.
    #[must_use]
    pub const fn original_key(&self) -> Option<&FieldValue> {
        self.original_key.as_ref()
    }

    /// Property values as of attach or the last successful save.
    #[must_use]
    pub fn original_values(&self) -> &[FieldValue] {
        &self.original
    }

    /// Whether change detection flagged the property at `index` as modified.
    #[must_use]
    pub fn is_property_modified(&self, index: usize) -> bool {
        self.modified.get(index).copied().unwrap_or(false)
    }

    fn accept(&mut self) {
        match self.state {
            EntityState::Added | EntityState::Modified | EntityState::Unchanged => {
                self.original_key = self.entity.key();
                self.original = self.entity.values();
                self.modified.fill(false);
                self.forced = false;
                self.state = EntityState::Unchanged;
            }
            EntityState::Deleted => self.state = EntityState::Detached,
            EntityState::Detached => {}
        }
    }
}

/// Collects pending inserts, updates and deletes for one save.
///
/// Each caller owns its tracker; trackers are never shared between units of
/// work. Entries stay in place after a save so [`EntryId`]s keep resolving,
/// which lets callers read generated keys back.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    entries: Vec<TrackedEntry>,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new entity to be inserted.
    pub fn add<E: Entity>(&mut self, entity: E) -> EntryId {
        self.push(TrackedEntry::new(entity.into_tracked(), EntityState::Added))
    }

    /// Track an entity loaded from storage. Its current values become the
    /// originals that later changes are compared against.
    pub fn attach<E: Entity>(&mut self, entity: E) -> EntryId {
        self.push(TrackedEntry::new(
            entity.into_tracked(),
            EntityState::Unchanged,
        ))
    }

    fn push(&mut self, entry: TrackedEntry) -> EntryId {
        self.entries.push(entry);
        EntryId(self.entries.len() - 1)
    }

    /// Schedule an entity for deletion. Removing an entity that was only
    /// added detaches it without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the entry is unknown or detached.
    pub fn remove(&mut self, id: EntryId) -> Result<(), DatabaseError> {
        let entry = self.live_entry_mut(id)?;
        entry.state = match entry.state {
            EntityState::Added => EntityState::Detached,
            _ => EntityState::Deleted,
        };
        Ok(())
    }

    /// Flag every property of an attached entity as modified, whether or not
    /// its value changed. Unchanged values still produce no diff entries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` unless the entry is attached.
    pub fn mark_modified(&mut self, id: EntryId) -> Result<(), DatabaseError> {
        let entry = self.live_entry_mut(id)?;
        match entry.state {
            EntityState::Unchanged | EntityState::Modified => {
                entry.forced = true;
                entry.modified.fill(true);
                entry.state = EntityState::Modified;
                Ok(())
            }
            state => Err(DatabaseError::InvalidState(format!(
                "cannot mark {state:?} entity as modified"
            ))),
        }
    }

    #[must_use]
    pub fn entity<E: Entity>(&self, id: EntryId) -> Option<&E> {
        self.entries.get(id.0).and_then(|e| E::from_tracked(&e.entity))
    }

    /// Mutable access for applying changes. Detached entries are read-only.
    pub fn entity_mut<E: Entity>(&mut self, id: EntryId) -> Option<&mut E> {
        self.entries
            .get_mut(id.0)
            .filter(|e| e.state != EntityState::Detached)
            .and_then(|e| E::from_tracked_mut(&mut e.entity))
    }

    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&TrackedEntry> {
        self.entries.get(id.0)
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> Option<&mut TrackedEntry> {
        self.entries.get_mut(id.0)
    }

    #[must_use]
    pub fn state(&self, id: EntryId) -> EntityState {
        self.entries
            .get(id.0)
            .map_or(EntityState::Detached, TrackedEntry::state)
    }

    /// All entries that are still tracked, in the order they were added.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &TrackedEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state != EntityState::Detached)
            .map(|(i, e)| (EntryId(i), e))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compare attached entities with their originals. An unchanged entity
    /// with a differing property becomes `Modified`; a modified one whose
    /// values all match again (and was not force-marked) becomes `Unchanged`.
    pub fn detect_changes(&mut self) {
        for entry in &mut self.entries {
            if !matches!(entry.state, EntityState::Unchanged | EntityState::Modified) {
                continue;
            }
            let current = entry.entity.values();
            if !entry.forced {
                entry.modified = current
                    .iter()
                    .zip(&entry.original)
                    .map(|(now, before)| now != before)
                    .collect();
            }
            entry.state = if entry.forced || entry.modified.contains(&true) {
                EntityState::Modified
            } else {
                EntityState::Unchanged
            };
        }
    }

    /// Check that no stored entity had its key edited since it was attached.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` naming the first entity whose
    /// key differs from the one it was loaded with.
    pub fn ensure_keys_unchanged(&self) -> Result<(), DatabaseError> {
        let changed = self.entries().find(|(_, e)| {
            e.state != EntityState::Added && e.entity.key() != e.original_key
        });
        match changed {
            Some((_, entry)) => {
                let render = |key: Option<FieldValue>| {
                    key.and_then(|k| k.to_audit_string())
                        .unwrap_or_else(|| "<none>".to_string())
                };
                Err(DatabaseError::InvalidState(format!(
                    "{} key is read-only: changed from {} to {}",
                    entry.entity.meta().table_name,
                    render(entry.original_key.clone()),
                    render(entry.entity.key()),
                )))
            }
            None => Ok(()),
        }
    }

    /// Run change detection and report whether a save would write anything.
    pub fn has_changes(&mut self) -> bool {
        self.detect_changes();
        self.entries().any(|(_, e)| e.state != EntityState::Unchanged)
    }

    /// Added entries whose database-generated key is still unassigned.
    pub(crate) fn pending_generated_keys(&self) -> Vec<EntryId> {
        self.entries()
            .filter(|(_, e)| {
                e.state == EntityState::Added
                    && e.entity.meta().generated_key
                    && e.entity.key().is_none()
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Undo key assignments made during a failed save.
    pub(crate) fn clear_generated_keys(&mut self, ids: &[EntryId]) {
        for id in ids {
            if let Some(entry) = self.entries.get_mut(id.0) {
                entry.entity.assign_generated_key(None);
            }
        }
    }

    /// Mark everything as persisted: added and modified entries become
    /// unchanged with fresh originals, deleted entries become detached.
    pub fn accept_changes(&mut self) {
        for entry in &mut self.entries {
            entry.accept();
        }
    }

    fn live_entry_mut(&mut self, id: EntryId) -> Result<&mut TrackedEntry, DatabaseError> {
        self.entries
            .get_mut(id.0)
            .filter(|e| e.state != EntityState::Detached)
            .ok_or_else(|| DatabaseError::InvalidState(format!("entry {} is not tracked", id.0)))
    }
}

#[cfg(test)]
mod tests {
    use mh_core::entities::Post;
    use mh_core::ids::PostId;
    use mh_core::values::PostName;

    use super::*;

    fn post(name: &str, area: f64) -> Post {
        Post::new(PostName::new(name).unwrap(), area)
    }

    fn stored_post(id: i64, name: &str, area: f64) -> Post {
        let mut p = post(name, area);
        p.id = Some(PostId(id));
        p
    }

    #[test]
    fn attach_then_mutate_is_detected() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(stored_post(1, "North", 10.0));
        assert!(!uow.has_changes());

        uow.entity_mut::<Post>(id).unwrap().change_area(12.0);
        uow.detect_changes();

        assert_eq!(uow.state(id), EntityState::Modified);
        let entry = uow.entry(id).unwrap();
        assert!(!entry.is_property_modified(0));
        assert!(entry.is_property_modified(1));
    }

    #[test]
    fn reverting_a_change_returns_to_unchanged() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(stored_post(1, "North", 10.0));
        uow.entity_mut::<Post>(id).unwrap().change_area(12.0);
        uow.detect_changes();
        uow.entity_mut::<Post>(id).unwrap().change_area(10.0);
        uow.detect_changes();
        assert_eq!(uow.state(id), EntityState::Unchanged);
    }

    #[test]
    fn removing_added_entity_detaches_it() {
        let mut uow = ChangeTracker::new();
        let id = uow.add(post("North", 1.0));
        uow.remove(id).unwrap();
        assert_eq!(uow.state(id), EntityState::Detached);
        assert!(uow.is_empty());
        assert!(uow.remove(id).is_err());
    }

    #[test]
    fn removing_attached_entity_deletes_it() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(stored_post(3, "North", 1.0));
        uow.remove(id).unwrap();
        assert_eq!(uow.state(id), EntityState::Deleted);
        assert!(uow.has_changes());
    }

    #[test]
    fn mark_modified_forces_update() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(stored_post(3, "North", 1.0));
        uow.mark_modified(id).unwrap();
        uow.detect_changes();
        assert_eq!(uow.state(id), EntityState::Modified);

        let added = uow.add(post("South", 1.0));
        assert!(uow.mark_modified(added).is_err());
    }

    #[test]
    fn accept_changes_refreshes_originals() {
        let mut uow = ChangeTracker::new();
        let added = uow.add(post("South", 1.0));
        let edited = uow.attach(stored_post(1, "North", 10.0));
        let deleted = uow.attach(stored_post(2, "East", 3.0));
        uow.entity_mut::<Post>(edited).unwrap().change_area(11.0);
        uow.remove(deleted).unwrap();
        uow.detect_changes();

        uow.accept_changes();

        assert_eq!(uow.state(added), EntityState::Unchanged);
        assert_eq!(uow.state(edited), EntityState::Unchanged);
        assert_eq!(uow.state(deleted), EntityState::Detached);
        assert_eq!(
            uow.entry(edited).unwrap().original_values()[1],
            FieldValue::Real(11.0)
        );
        assert!(!uow.has_changes());
        assert!(uow.entity_mut::<Post>(deleted).is_none());
        assert!(uow.entity::<Post>(deleted).is_some());
    }

    #[test]
    fn edited_key_of_attached_entity_is_rejected() {
        let mut uow = ChangeTracker::new();
        let id = uow.attach(stored_post(1, "North", 10.0));
        uow.add(post("South", 1.0));
        assert!(uow.ensure_keys_unchanged().is_ok());

        uow.entity_mut::<Post>(id).unwrap().id = Some(PostId(2));
        let err = uow.ensure_keys_unchanged().unwrap_err();
        assert!(
            matches!(&err, DatabaseError::InvalidState(msg) if msg.contains("from 1 to 2")),
            "got: {err}"
        );

        uow.entity_mut::<Post>(id).unwrap().id = Some(PostId(1));
        assert!(uow.ensure_keys_unchanged().is_ok());
    }

    #[test]
    fn generated_key_becomes_original_after_accept() {
        let mut uow = ChangeTracker::new();
        let id = uow.add(post("South", 1.0));
        uow.entry_mut(id).unwrap().entity_mut().assign_generated_key(Some(7));
        uow.accept_changes();
        assert_eq!(
            uow.entry(id).unwrap().original_key(),
            Some(&FieldValue::Integer(7))
        );
        assert!(uow.ensure_keys_unchanged().is_ok());
    }

    #[test]
    fn pending_keys_can_be_cleared() {
        let mut uow = ChangeTracker::new();
        let id = uow.add(post("South", 1.0));
        let pending = uow.pending_generated_keys();
        assert_eq!(pending, vec![id]);

        uow.entry_mut(id).unwrap().entity_mut().assign_generated_key(Some(5));
        assert_eq!(uow.entity::<Post>(id).unwrap().id, Some(PostId(5)));

        uow.clear_generated_keys(&pending);
        assert_eq!(uow.entity::<Post>(id).unwrap().id, None);
    }
}
