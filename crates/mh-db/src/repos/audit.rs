//! Audit record repository.
//!
//! Records are written only by `save_changes` inside its transaction and
//! never updated afterwards. Reads support dynamic filtering.

use std::collections::HashMap;

use mh_core::entities::{AuditEntry, AuditRecord};
use mh_core::enums::AuditOperation;
use mh_core::ids::PREFIX_AUDIT;

use crate::DbRows;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_datetime, placeholders};
use crate::service::MhService;
use crate::tracking::builder::NewAuditRecord;

pub(crate) const AUDIT_COLUMNS: &str =
    "a.id, a.operation, a.table_name, a.record_id, a.change_date, a.change_author_id";

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub operation: Option<AuditOperation>,
    pub change_author_id: Option<String>,
    pub limit: Option<u32>,
}

/// Insert built records and their entries on `conn`, returning the stored
/// form with database-assigned ids.
pub(crate) async fn insert_audit_records(
    conn: &libsql::Connection,
    records: Vec<NewAuditRecord>,
) -> Result<Vec<AuditRecord>, DatabaseError> {
    let mut stored = Vec::with_capacity(records.len());
    for record in records {
        let mut rows = conn
            .query(
                &format!(
                    "INSERT INTO audits (id, operation, table_name, record_id, change_date, change_author_id)
                     VALUES ('{PREFIX_AUDIT}-' || lower(hex(randomblob(8))), ?1, ?2, ?3, ?4, ?5)
                     RETURNING id"
                ),
                libsql::params![
                    record.operation.as_str(),
                    record.table_name,
                    record.record_id.as_str(),
                    format_datetime(&record.change_date),
                    record.change_author_id.as_deref()
                ],
            )
            .await?;
        let id = {
            let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
            row.get::<String>(0)?
        };
        while rows.next().await?.is_some() {}

        for (position, entry) in record.changes.iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|e| DatabaseError::InvalidState(format!("entry position: {e}")))?;
            conn.execute(
                "INSERT INTO audit_entries (audit_id, position, field_name, old_value, new_value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    id.as_str(),
                    position,
                    entry.field_name.as_str(),
                    entry.old_value.as_deref(),
                    entry.new_value.as_deref()
                ],
            )
            .await?;
        }

        stored.push(AuditRecord {
            id,
            operation: record.operation,
            table_name: record.table_name.to_string(),
            record_id: record.record_id,
            change_date: record.change_date,
            change_author_id: record.change_author_id,
            changes: record.changes,
        });
    }
    Ok(stored)
}

pub(crate) fn row_to_audit(row: &libsql::Row) -> Result<AuditRecord, DatabaseError> {
    let operation: AuditOperation = row.get::<String>(1)?.parse()?;
    Ok(AuditRecord {
        id: row.get::<String>(0)?,
        operation,
        table_name: row.get::<String>(2)?,
        record_id: row.get::<String>(3)?,
        change_date: parse_datetime(&row.get::<String>(4)?)?,
        change_author_id: get_opt_string(row, 5)?,
        changes: Vec::new(),
    })
}

/// Collect audit rows, then load their entries with one batched query.
pub(crate) async fn collect_audits(
    service: &MhService,
    mut rows: DbRows<'_>,
) -> Result<Vec<AuditRecord>, DatabaseError> {
    let mut audits = Vec::new();
    while let Some(row) = rows.next().await? {
        audits.push(row_to_audit(&row)?);
    }
    // release the connection before the entries query
    drop(rows);
    attach_entries(service, &mut audits).await?;
    Ok(audits)
}

async fn attach_entries(
    service: &MhService,
    audits: &mut [AuditRecord],
) -> Result<(), DatabaseError> {
    if audits.is_empty() {
        return Ok(());
    }
    let ids: Vec<libsql::Value> = audits
        .iter()
        .map(|a| libsql::Value::Text(a.id.clone()))
        .collect();
    let mut rows = service
        .db()
        .query(
            &format!(
                "SELECT audit_id, field_name, old_value, new_value FROM audit_entries
                 WHERE audit_id IN ({}) ORDER BY audit_id, position",
                placeholders(1, ids.len())
            ),
            libsql::params_from_iter(ids),
        )
        .await?;

    let mut by_audit: HashMap<String, Vec<AuditEntry>> = HashMap::new();
    while let Some(row) = rows.next().await? {
        by_audit
            .entry(row.get::<String>(0)?)
            .or_default()
            .push(AuditEntry::new(
                row.get::<String>(1)?,
                row.get::<Option<String>>(2)?,
                row.get::<Option<String>>(3)?,
            ));
    }
    for audit in audits {
        if let Some(entries) = by_audit.remove(&audit.id) {
            audit.changes = entries;
        }
    }
    Ok(())
}

impl MhService {
    /// Query audit records with optional filters.
    ///
    /// Returns the newest `limit` matches (default 100) in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditRecord>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref table) = filter.table_name {
            params.push(libsql::Value::Text(table.clone()));
            conditions.push(format!("a.table_name = ?{}", params.len()));
        }
        if let Some(ref record) = filter.record_id {
            params.push(libsql::Value::Text(record.clone()));
            conditions.push(format!("a.record_id = ?{}", params.len()));
        }
        if let Some(operation) = filter.operation {
            params.push(libsql::Value::Text(operation.as_str().to_string()));
            conditions.push(format!("a.operation = ?{}", params.len()));
        }
        if let Some(ref author) = filter.change_author_id {
            params.push(libsql::Value::Text(author.clone()));
            conditions.push(format!("a.change_author_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audits a {where_clause}
             ORDER BY a.change_date DESC, a.rowid DESC LIMIT {limit}"
        );

        let rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut audits = collect_audits(self, rows).await?;
        audits.reverse();
        Ok(audits)
    }

    /// # Errors
    ///
    /// `NotFound` if no audit record has this id.
    pub async fn get_audit(&self, id: &str) -> Result<AuditRecord, DatabaseError> {
        let rows = self
            .db()
            .query(
                &format!("SELECT {AUDIT_COLUMNS} FROM audits a WHERE a.id = ?1"),
                [id],
            )
            .await?;
        collect_audits(self, rows)
            .await?
            .pop()
            .ok_or_else(|| DatabaseError::not_found("Audit", id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mh_core::identity::Actor;
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::test_support::helpers::test_service;

    fn new_record(record_id: &str, changes: Vec<AuditEntry>) -> NewAuditRecord {
        NewAuditRecord {
            operation: AuditOperation::Update,
            table_name: "Houses",
            record_id: record_id.to_string(),
            change_date: Utc::now(),
            change_author_id: Some("u-1".into()),
            changes,
        }
    }

    #[tokio::test]
    async fn inserted_records_read_back_with_ordered_entries() {
        let svc = test_service().await;
        let changes = vec![
            AuditEntry::new("Brigade", Some("A".into()), Some("B".into())),
            AuditEntry::new("RealEndDate", None, Some("2024-05-01".into())),
        ];
        let stored = insert_audit_records(svc.db().conn(), vec![new_record("H1", changes)])
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        let id = &stored[0].id;
        assert!(id.starts_with("aud-"), "{id}");
        assert_eq!(id.len(), 20, "{id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()), "{id}");

        let read = svc.get_audit(&stored[0].id).await.unwrap();
        assert_eq!(read.changes, stored[0].changes);
        assert_eq!(read.change_author_id.as_deref(), Some("u-1"));
        assert_eq!(
            read.change_date.timestamp_micros(),
            stored[0].change_date.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn missing_audit_is_not_found() {
        let svc = test_service().await;
        let err = svc.get_audit("aud-0000000000000000").await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn filter_by_operation_and_author() {
        let svc = test_service().await;
        let cancel = CancellationToken::new();
        let post = svc
            .create_post("Crane", 4.0, &Actor::user("u-7"), &cancel)
            .await
            .unwrap();
        svc.delete_post(post.id.unwrap(), &Actor::system(), &cancel)
            .await
            .unwrap();

        let by_user = svc
            .query_audit(&AuditFilter {
                change_author_id: Some("u-7".into()),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].operation, AuditOperation::Create);

        let deletes = svc
            .query_audit(&AuditFilter {
                table_name: Some("Posts".into()),
                operation: Some(AuditOperation::Delete),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].change_author_id, None);
    }

    #[tokio::test]
    async fn limit_keeps_newest_in_chronological_order() {
        let svc = test_service().await;
        let cancel = CancellationToken::new();
        for name in ["A", "B", "C"] {
            svc.create_post(name, 1.0, &Actor::system(), &cancel)
                .await
                .unwrap();
        }
        let audits = svc
            .query_audit(&AuditFilter {
                limit: Some(2),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        let ids: Vec<&str> = audits.iter().map(|a| a.record_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
