//! Week mark repository.

use mh_core::entities::WeekMark;
use mh_core::identity::Actor;
use mh_core::ids::{HouseWeekInfoId, WeekMarkId};
use mh_core::requests::{CreateWeekMarkRequest, UpdateWeekMarkRequest};
use mh_core::values::MarkComment;
use tokio_util::sync::CancellationToken;

use crate::error::DatabaseError;
use crate::helpers::parse_enum;
use crate::service::MhService;
use crate::tracking::ChangeTracker;

fn row_to_week_mark(row: &libsql::Row) -> Result<WeekMark, DatabaseError> {
    Ok(WeekMark {
        id: Some(WeekMarkId(row.get::<i64>(0)?)),
        house_week_info_id: HouseWeekInfoId(row.get::<i64>(1)?),
        mark_type: parse_enum(&row.get::<String>(2)?)?,
        comment: row.get::<String>(3)?,
    })
}

impl MhService {
    /// # Errors
    ///
    /// `NotFound` if the week info does not exist, `Validation` for a bad comment.
    pub async fn create_week_mark(
        &self,
        request: CreateWeekMarkRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<WeekMark, DatabaseError> {
        let comment = MarkComment::new(&request.comment)?;
        self.get_week_info(request.house_week_info_id).await?;

        let mut uow = ChangeTracker::new();
        let entry = uow.add(WeekMark::new(
            request.house_week_info_id,
            request.mark_type,
            comment,
        ));
        self.save_changes(&mut uow, actor, cancel).await?;

        uow.entity::<WeekMark>(entry)
            .cloned()
            .ok_or_else(|| DatabaseError::InvalidState("saved mark missing from tracker".into()))
    }

    /// # Errors
    ///
    /// `NotFound` if the mark does not exist, `Validation` for a bad comment.
    pub async fn update_week_mark(
        &self,
        request: UpdateWeekMarkRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<WeekMark, DatabaseError> {
        let comment = MarkComment::new(&request.comment)?;
        let mark = self.get_week_mark(request.id).await?;

        let mut uow = ChangeTracker::new();
        let entry = uow.attach(mark);
        let mark = uow
            .entity_mut::<WeekMark>(entry)
            .ok_or_else(|| DatabaseError::InvalidState("attached mark missing".into()))?;
        mark.change_mark_type(request.mark_type);
        mark.change_comment(comment);
        self.save_changes(&mut uow, actor, cancel).await?;

        self.get_week_mark(request.id).await
    }

    /// # Errors
    ///
    /// `NotFound` if the mark does not exist.
    pub async fn delete_week_mark(
        &self,
        id: WeekMarkId,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        let mark = self.get_week_mark(id).await?;
        let mut uow = ChangeTracker::new();
        let entry = uow.attach(mark);
        uow.remove(entry)?;
        self.save_changes(&mut uow, actor, cancel).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// `NotFound` if the mark does not exist.
    pub async fn get_week_mark(&self, id: WeekMarkId) -> Result<WeekMark, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT id, house_week_info_id, mark_type, comment FROM week_marks WHERE id = ?1",
                [id.value()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("WeekMark", id))?;
        row_to_week_mark(&row)
    }

    /// # Errors
    ///
    /// `NotFound` if the week info does not exist.
    pub async fn list_week_marks_for_week(
        &self,
        week_id: HouseWeekInfoId,
    ) -> Result<Vec<WeekMark>, DatabaseError> {
        self.get_week_info(week_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT id, house_week_info_id, mark_type, comment FROM week_marks
                 WHERE house_week_info_id = ?1 ORDER BY id",
                [week_id.value()],
            )
            .await?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next().await? {
            marks.push(row_to_week_mark(&row)?);
        }
        Ok(marks)
    }
}

#[cfg(test)]
mod tests {
    use mh_core::enums::MarkType;

    use super::*;
    use crate::test_support::helpers::{seeded_house, seeded_week, test_service};

    #[tokio::test]
    async fn create_requires_existing_week() {
        let svc = test_service().await;
        let err = svc
            .create_week_mark(
                CreateWeekMarkRequest {
                    house_week_info_id: HouseWeekInfoId(404),
                    mark_type: MarkType::RedMark,
                    comment: "crack".into(),
                },
                &Actor::system(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_update_list_delete() {
        let svc = test_service().await;
        let cancel = CancellationToken::new();
        seeded_house(&svc, "H1").await;
        let week_id = seeded_week(&svc, "H1").await;

        let mark = svc
            .create_week_mark(
                CreateWeekMarkRequest {
                    house_week_info_id: week_id,
                    mark_type: MarkType::RedMark,
                    comment: " crack ".into(),
                },
                &Actor::system(),
                &cancel,
            )
            .await
            .unwrap();
        let id = mark.id.unwrap();
        assert_eq!(mark.comment, "crack");

        let updated = svc
            .update_week_mark(
                UpdateWeekMarkRequest {
                    id,
                    mark_type: MarkType::BlueMark,
                    comment: "fixed".into(),
                },
                &Actor::system(),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(updated.mark_type, MarkType::BlueMark);
        assert_eq!(
            svc.list_week_marks_for_week(week_id).await.unwrap(),
            vec![updated]
        );

        svc.delete_week_mark(id, &Actor::system(), &cancel)
            .await
            .unwrap();
        assert!(svc.list_week_marks_for_week(week_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let svc = test_service().await;
        seeded_house(&svc, "H1").await;
        let week_id = seeded_week(&svc, "H1").await;
        let err = svc
            .create_week_mark(
                CreateWeekMarkRequest {
                    house_week_info_id: week_id,
                    mark_type: MarkType::RedMark,
                    comment: "  ".into(),
                },
                &Actor::system(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }
}
