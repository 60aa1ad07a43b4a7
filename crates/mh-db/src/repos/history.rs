//! Audit history per house and per construction week.
//!
//! A history is the audit trail of one root entity plus the children that
//! currently belong to it, read in one query ordered by `change_date`.
//! Records written by the same save share a `change_date` and come back in
//! insertion order.
//!
//! The trail outlives the entity: a deleted house or week still returns its
//! own records. `NotFound` means the id is neither stored nor audited.

use mh_core::entities::AuditRecord;
use mh_core::ids::{HouseId, HouseWeekInfoId};

use crate::error::DatabaseError;
use crate::repos::audit::{AUDIT_COLUMNS, collect_audits};
use crate::service::MhService;
use crate::tracking::EntityKind;

/// Audit records of one logical table for a set of record ids.
struct Group {
    kind: EntityKind,
    record_ids: Vec<String>,
}

impl Group {
    fn one(kind: EntityKind, record_id: impl ToString) -> Self {
        Self {
            kind,
            record_ids: vec![record_id.to_string()],
        }
    }
}

impl MhService {
    /// Audit records of the house itself, without children.
    ///
    /// # Errors
    ///
    /// `NotFound` if the house neither exists nor has audit records.
    pub async fn get_root_history(
        &self,
        house_id: &HouseId,
    ) -> Result<Vec<AuditRecord>, DatabaseError> {
        let records = self
            .history(&[Group::one(EntityKind::House, house_id)])
            .await?;
        if records.is_empty() {
            self.get_house(house_id).await?;
        }
        Ok(records)
    }

    /// Audit records of a week info and of its marks.
    ///
    /// # Errors
    ///
    /// `NotFound` if the week info neither exists nor has audit records.
    pub async fn get_sub_entity_history(
        &self,
        week_id: HouseWeekInfoId,
    ) -> Result<Vec<AuditRecord>, DatabaseError> {
        let marks = self
            .child_ids(
                "SELECT id FROM week_marks WHERE house_week_info_id = ?1",
                libsql::Value::Integer(week_id.value()),
            )
            .await?;
        let records = self
            .history(&[
                Group::one(EntityKind::WeekInfo, week_id),
                Group {
                    kind: EntityKind::WeekMark,
                    record_ids: marks,
                },
            ])
            .await?;
        if records.is_empty() {
            self.get_week_info(week_id).await?;
        }
        Ok(records)
    }

    /// Audit records of the house, its post links, its week infos and
    /// their marks.
    ///
    /// # Errors
    ///
    /// `NotFound` if the house neither exists nor has audit records.
    pub async fn get_full_history(
        &self,
        house_id: &HouseId,
    ) -> Result<Vec<AuditRecord>, DatabaseError> {
        let key = || libsql::Value::Text(house_id.as_str().to_string());

        let links = self
            .child_ids("SELECT id FROM house_posts WHERE house_id = ?1", key())
            .await?;
        let weeks = self
            .child_ids("SELECT id FROM house_week_infos WHERE house_id = ?1", key())
            .await?;
        let marks = self
            .child_ids(
                "SELECT m.id FROM week_marks m
                 JOIN house_week_infos w ON w.id = m.house_week_info_id
                 WHERE w.house_id = ?1",
                key(),
            )
            .await?;

        let records = self
            .history(&[
                Group::one(EntityKind::House, house_id),
                Group {
                    kind: EntityKind::HousePost,
                    record_ids: links,
                },
                Group {
                    kind: EntityKind::WeekInfo,
                    record_ids: weeks,
                },
                Group {
                    kind: EntityKind::WeekMark,
                    record_ids: marks,
                },
            ])
            .await?;
        if records.is_empty() {
            self.get_house(house_id).await?;
        }
        Ok(records)
    }

    async fn child_ids(
        &self,
        sql: &str,
        parent: libsql::Value,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut rows = self.db().query(sql, [parent]).await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<i64>(0)?.to_string());
        }
        Ok(ids)
    }

    async fn history(&self, groups: &[Group]) -> Result<Vec<AuditRecord>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        for group in groups.iter().filter(|g| !g.record_ids.is_empty()) {
            params.push(libsql::Value::Text(group.kind.table_name().to_string()));
            let table_param = params.len();
            let first = params.len() + 1;
            params.extend(
                group
                    .record_ids
                    .iter()
                    .map(|id| libsql::Value::Text(id.clone())),
            );
            let ids = (first..=params.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            conditions.push(format!(
                "(a.table_name = ?{table_param} AND a.record_id IN ({ids}))"
            ));
        }
        if conditions.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM audits a WHERE {}
             ORDER BY a.change_date, a.rowid",
            conditions.join(" OR ")
        );
        let rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let audits = collect_audits(self, rows).await?;
        tracing::debug!(records = audits.len(), "history loaded");
        Ok(audits)
    }
}

#[cfg(test)]
mod tests {
    use mh_core::enums::AuditOperation;
    use mh_core::identity::Actor;
    use pretty_assertions::assert_eq;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::test_support::helpers::{seeded_house, seeded_week, test_service};

    fn tables(records: &[AuditRecord]) -> Vec<&str> {
        records.iter().map(|r| r.table_name.as_str()).collect()
    }

    #[tokio::test]
    async fn missing_house_is_not_found() {
        let svc = test_service().await;
        let err = svc
            .get_full_history(&HouseId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { ref entity, .. } if entity == "House"));
        assert!(svc.get_root_history(&HouseId::new("nope")).await.is_err());
        assert!(svc.get_sub_entity_history(HouseWeekInfoId(1)).await.is_err());
    }

    #[tokio::test]
    async fn root_history_excludes_children() {
        let svc = test_service().await;
        seeded_house(&svc, "H1").await;
        seeded_week(&svc, "H1").await;

        let root = svc.get_root_history(&HouseId::new("H1")).await.unwrap();
        assert_eq!(tables(&root), vec!["Houses"]);

        let full = svc.get_full_history(&HouseId::new("H1")).await.unwrap();
        assert_eq!(tables(&full), vec!["Houses", "HouseWeekInfos"]);
    }

    #[tokio::test]
    async fn histories_are_scoped_to_their_house() {
        let svc = test_service().await;
        seeded_house(&svc, "H1").await;
        seeded_house(&svc, "H2").await;
        seeded_week(&svc, "H2").await;

        let full = svc.get_full_history(&HouseId::new("H1")).await.unwrap();
        assert_eq!(full.len(), 1);
        assert!(full.iter().all(|r| r.record_id == "H1"));
    }

    #[tokio::test]
    async fn week_history_includes_its_marks() {
        let svc = test_service().await;
        let cancel = CancellationToken::new();
        seeded_house(&svc, "H1").await;
        let week = seeded_week(&svc, "H1").await;
        let other = seeded_week(&svc, "H1").await;
        svc.create_week_mark(
            mh_core::requests::CreateWeekMarkRequest {
                house_week_info_id: week,
                mark_type: mh_core::enums::MarkType::RedMark,
                comment: "crack".into(),
            },
            &Actor::system(),
            &cancel,
        )
        .await
        .unwrap();

        let history = svc.get_sub_entity_history(week).await.unwrap();
        assert_eq!(tables(&history), vec!["HouseWeekInfos", "WeekMarks"]);
        assert!(history.iter().all(|r| r.operation == AuditOperation::Create));

        let quiet = svc.get_sub_entity_history(other).await.unwrap();
        assert_eq!(quiet.len(), 1);
    }

    #[tokio::test]
    async fn stored_house_without_trail_has_empty_history() {
        let svc = test_service().await;
        svc.db()
            .execute(
                "INSERT INTO houses (id, length, width, top_left_corner_x, top_left_corner_y,
                                     current_state, official_start_date, brigade)
                 VALUES ('H9', 1.0, 1.0, 0, 0, 'planned', '2024-01-01', 'Alpha')",
                (),
            )
            .await
            .unwrap();

        assert!(svc.get_root_history(&HouseId::new("H9")).await.unwrap().is_empty());
        assert!(svc.get_full_history(&HouseId::new("H9")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleted_week_keeps_its_own_trail() {
        let svc = test_service().await;
        seeded_house(&svc, "H1").await;
        let week = seeded_week(&svc, "H1").await;
        svc.delete_week_info(week, &Actor::system(), &CancellationToken::new())
            .await
            .unwrap();

        let history = svc.get_sub_entity_history(week).await.unwrap();
        assert_eq!(
            history.iter().map(|r| r.operation).collect::<Vec<_>>(),
            vec![AuditOperation::Create, AuditOperation::Delete]
        );
    }
}
