//! Service layer hosting every repository and the save orchestrator.
//!
//! `MhService` wraps `MhDb`. Repository methods live in `impl MhService`
//! blocks under [`crate::repos`]; all writes funnel through
//! [`MhService::save_changes`](crate::save).

use std::sync::Arc;

use crate::MhDb;
use crate::error::DatabaseError;
use crate::save::SaveHook;

pub struct MhService {
    db: MhDb,
    save_hook: Option<Arc<dyn SaveHook>>,
}

impl MhService {
    /// Create a service over a local database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = MhDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    #[must_use]
    pub const fn from_db(db: MhDb) -> Self {
        Self {
            db,
            save_hook: None,
        }
    }

    /// Install a hook that runs inside every save, after the audit rows are
    /// written and before commit.
    #[must_use]
    pub fn with_save_hook(mut self, hook: Arc<dyn SaveHook>) -> Self {
        self.save_hook = Some(hook);
        self
    }

    pub(crate) fn save_hook(&self) -> Option<&dyn SaveHook> {
        self.save_hook.as_deref()
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &MhDb {
        &self.db
    }
}

impl std::fmt::Debug for MhService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MhService")
            .field("save_hook", &self.save_hook.is_some())
            .finish_non_exhaustive()
    }
}
