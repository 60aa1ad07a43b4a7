//! Transactional save orchestration.
//!
//! One call to [`MhService::save_changes`] writes every pending change in a
//! [`ChangeTracker`] together with one audit record per changed entity, in
//! a single transaction:
//!
//! 1. begin
//! 2. snapshot pending changes (operations and field diffs)
//! 3. primary write: deletes child-first, inserts parent-first, then updates
//! 4. build audit records (keys are known now) and insert them
//! 5. commit and accept the tracker's changes
//!
//! Any failure or cancellation rolls the transaction back, clears keys that
//! were assigned during the attempt and returns the original error.
//!
//! The connection is reserved for the whole call, so concurrent saves on one
//! service wait for each other instead of nesting transactions.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use mh_core::entities::AuditRecord;
use mh_core::enums::AuditOperation;
use mh_core::identity::Actor;
use tokio_util::sync::CancellationToken;

use crate::error::DatabaseError;
use crate::helpers::placeholders;
use crate::repos::audit::insert_audit_records;
use crate::service::MhService;
use crate::tracking::snapshot::{self, ChangeSnapshot};
use crate::tracking::{ChangeTracker, TrackedEntity, builder};

/// Callback run inside the save transaction, after the audit rows are
/// inserted and before commit. Returning an error aborts the save.
pub trait SaveHook: Send + Sync {
    /// # Errors
    ///
    /// Any error rolls the whole save back and is returned to the caller.
    fn before_commit(&self, audits: &[AuditRecord]) -> Result<(), DatabaseError>;
}

struct Written {
    rows: u64,
    audits: Vec<AuditRecord>,
}

impl MhService {
    /// Persist all pending changes in `uow` with their audit trail.
    ///
    /// Returns the number of entity rows written (audit rows excluded).
    /// Every record of one call shares a single `change_date`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::InvalidState` if a stored entity's key was edited;
    ///   nothing is written.
    /// - `DatabaseError::Cancelled` if `cancel` fires before commit.
    /// - `DatabaseError::NotFound` if an updated or deleted row is gone.
    /// - Any storage error from the primary write, the audit insert or the
    ///   save hook, after the transaction has been rolled back.
    pub async fn save_changes(
        &self,
        uow: &mut ChangeTracker,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<u64, DatabaseError> {
        uow.ensure_keys_unchanged()?;
        let _gate = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(DatabaseError::Cancelled),
            gate = self.db().reserve() => gate,
        };
        let tx = self.db().conn().transaction().await?;
        let snapshots = snapshot::extract(uow);
        let pending_keys = uow.pending_generated_keys();
        let change_date = Utc::now();
        tracing::debug!(changes = snapshots.len(), "save transaction started");

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(DatabaseError::Cancelled),
            result = self.write_unit(&tx, uow, &snapshots, actor, change_date) => result,
        };
        let outcome = match outcome {
            Ok(_) if cancel.is_cancelled() => Err(DatabaseError::Cancelled),
            other => other,
        };

        match outcome {
            Ok(written) => {
                if let Err(error) = tx.commit().await {
                    uow.clear_generated_keys(&pending_keys);
                    tracing::warn!(%error, "save commit failed");
                    return Err(error.into());
                }
                uow.accept_changes();
                tracing::info!(
                    rows = written.rows,
                    audits = written.audits.len(),
                    author = actor.author_id.as_deref().unwrap_or("system"),
                    "save committed"
                );
                Ok(written.rows)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!(%rollback_error, "rollback failed");
                }
                uow.clear_generated_keys(&pending_keys);
                tracing::warn!(%error, "save rolled back");
                Err(error)
            }
        }
    }

    async fn write_unit(
        &self,
        conn: &libsql::Connection,
        uow: &mut ChangeTracker,
        snapshots: &[ChangeSnapshot],
        actor: &Actor,
        change_date: DateTime<Utc>,
    ) -> Result<Written, DatabaseError> {
        let of = |op: AuditOperation| snapshots.iter().filter(move |s| s.operation == op);

        let mut deletes: Vec<&ChangeSnapshot> = of(AuditOperation::Delete).collect();
        deletes.sort_by_key(|s| Reverse(s.kind.save_rank()));
        let mut inserts: Vec<&ChangeSnapshot> = of(AuditOperation::Create).collect();
        inserts.sort_by_key(|s| s.kind.save_rank());

        let mut rows = 0;
        for snap in deletes {
            rows += delete_entity(conn, tracked(uow, snap)?).await?;
        }
        for snap in inserts {
            let entity = uow
                .entry_mut(snap.entry)
                .ok_or_else(|| untracked(snap))?
                .entity_mut();
            rows += insert_entity(conn, entity).await?;
        }
        for snap in of(AuditOperation::Update) {
            rows += update_entity(conn, tracked(uow, snap)?).await?;
        }

        let records = builder::build_records(snapshots, uow, change_date, actor);
        let audits = insert_audit_records(conn, records).await?;
        tracing::debug!(rows, audits = audits.len(), "primary write and audit insert done");

        if let Some(hook) = self.save_hook() {
            hook.before_commit(&audits)?;
        }

        Ok(Written { rows, audits })
    }
}

fn tracked<'a>(
    uow: &'a ChangeTracker,
    snap: &ChangeSnapshot,
) -> Result<&'a TrackedEntity, DatabaseError> {
    uow.entry(snap.entry)
        .map(crate::tracking::tracker::TrackedEntry::entity)
        .ok_or_else(|| untracked(snap))
}

fn untracked(snap: &ChangeSnapshot) -> DatabaseError {
    DatabaseError::InvalidState(format!("{:?} entry vanished during save", snap.kind))
}

fn missing_key(entity: &TrackedEntity) -> DatabaseError {
    DatabaseError::InvalidState(format!("{} row has no key", entity.meta().table_name))
}

/// Insert one row and write a database-generated key back into the entity.
async fn insert_entity(
    conn: &libsql::Connection,
    entity: &mut TrackedEntity,
) -> Result<u64, DatabaseError> {
    let meta = entity.meta();
    let mut columns = Vec::with_capacity(meta.properties.len() + 1);
    let mut params: Vec<libsql::Value> = Vec::with_capacity(meta.properties.len() + 1);

    if !meta.generated_key {
        let key = entity.key().ok_or_else(|| missing_key(entity))?;
        columns.push(meta.key.column);
        params.push((&key).into());
    }
    columns.extend(meta.properties.iter().map(|p| p.column));
    params.extend(entity.values().iter().map(libsql::Value::from));

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        meta.sql_table,
        columns.join(", "),
        placeholders(1, params.len()),
        meta.key.column
    );

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let key = {
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row.get_value(0)?
    };
    // step to completion so no write statement stays open until commit
    while rows.next().await?.is_some() {}

    if meta.generated_key {
        match key {
            libsql::Value::Integer(id) => entity.assign_generated_key(Some(id)),
            other => {
                return Err(DatabaseError::Query(format!(
                    "{} insert returned non-integer key {other:?}",
                    meta.table_name
                )));
            }
        }
    }
    Ok(1)
}

async fn update_entity(
    conn: &libsql::Connection,
    entity: &TrackedEntity,
) -> Result<u64, DatabaseError> {
    let meta = entity.meta();
    let key = entity.key().ok_or_else(|| missing_key(entity))?;

    let sets = meta
        .properties
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{} = ?{}", p.column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let mut params: Vec<libsql::Value> = entity.values().iter().map(libsql::Value::from).collect();
    params.push((&key).into());

    let sql = format!(
        "UPDATE {} SET {sets} WHERE {} = ?{}",
        meta.sql_table,
        meta.key.column,
        params.len()
    );
    let affected = conn.execute(&sql, libsql::params_from_iter(params)).await?;
    if affected == 0 {
        return Err(DatabaseError::not_found(meta.table_name, key));
    }
    Ok(affected)
}

async fn delete_entity(
    conn: &libsql::Connection,
    entity: &TrackedEntity,
) -> Result<u64, DatabaseError> {
    let meta = entity.meta();
    let key = entity.key().ok_or_else(|| missing_key(entity))?;

    let sql = format!(
        "DELETE FROM {} WHERE {} = ?1",
        meta.sql_table, meta.key.column
    );
    let affected = conn
        .execute(&sql, [libsql::Value::from(&key)])
        .await?;
    if affected == 0 {
        return Err(DatabaseError::not_found(meta.table_name, key));
    }
    Ok(affected)
}
