//! # mh-db
//!
//! libSQL persistence for mhouse.
//!
//! Business writes are collected in a [`tracking::ChangeTracker`] and saved
//! through [`service::MhService::save_changes`], which writes the entity rows
//! and their audit records in one transaction. The history queries in
//! [`repos::history`] read those audit records back per house or per week.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29).

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod save;
pub mod service;
pub mod tracking;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use tokio::sync::{Mutex, MutexGuard};

/// How long a writer waits for another process's lock on the database file.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database handle: one libSQL database and one connection.
///
/// Every statement on the connection runs under `gate`. Reads hold it while
/// their rows are stepped ([`DbRows`]); a save holds it from `BEGIN` to
/// commit or rollback, so saves from concurrent tasks run one after another
/// and no read observes an uncommitted save.
pub struct MhDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    gate: Mutex<()>,
}

/// Result rows of [`MhDb::query`]. The connection stays reserved until
/// this value is dropped.
pub struct DbRows<'a> {
    rows: libsql::Rows,
    _gate: MutexGuard<'a, ()>,
}

impl DbRows<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if stepping the statement fails.
    pub async fn next(&mut self) -> Result<Option<libsql::Row>, DatabaseError> {
        Ok(self.rows.next().await?)
    }
}

impl MhDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        // busy_timeout reports the new value as a row
        let mut rows = conn
            .query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        while rows.next().await?.is_some() {}
        drop(rows);

        let mh_db = Self {
            db,
            conn,
            gate: Mutex::new(()),
        };
        mh_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(mh_db)
    }

    /// The raw connection. Callers must hold [`Self::reserve`].
    pub(crate) const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Wait until no other statement or save is using the connection.
    pub(crate) async fn reserve(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails.
    pub async fn query(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<DbRows<'_>, DatabaseError> {
        let gate = self.reserve().await;
        let rows = self.conn.query(sql, params).await?;
        Ok(DbRows { rows, _gate: gate })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, DatabaseError> {
        let _gate = self.reserve().await;
        Ok(self.conn.execute(sql, params).await?)
    }

    /// Count rows in a table. Used by diagnostics and tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the table does not exist.
    pub async fn count_rows(&self, table: &str) -> Result<i64, DatabaseError> {
        let mut rows = self
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> MhDb {
        MhDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "houses",
            "posts",
            "house_posts",
            "house_week_infos",
            "week_marks",
            "audits",
            "audit_entries",
        ];
        for table in &tables {
            let mut rows = db
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn reads_wait_for_a_reserved_connection() {
        let db = test_db().await;
        let gate = db.reserve().await;
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            db.count_rows("houses"),
        )
        .await;
        assert!(blocked.is_err());

        drop(gate);
        assert_eq!(db.count_rows("houses").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn audits_are_append_only() {
        let db = test_db().await;
        db.execute(
            "INSERT INTO audits (id, operation, table_name, record_id, change_date)
             VALUES ('aud-1', 'Create', 'Houses', 'H1', '2024-01-01T00:00:00.000000Z')",
            (),
        )
        .await
        .unwrap();

        assert!(
            db.execute("UPDATE audits SET record_id = 'H2'", ())
                .await
                .is_err()
        );
        assert!(db.execute("DELETE FROM audits", ()).await.is_err());
        assert_eq!(db.count_rows("audits").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn foreign_keys_enforced() {
        let db = test_db().await;
        let result = db
            .execute(
                "INSERT INTO house_week_infos (house_id, start_date, status, on_time)
                 VALUES ('missing', '2024-01-01', 'not_started', 1)",
                (),
            )
            .await;
        assert!(result.is_err());
    }
}
