//! House week info repository.

use mh_core::entities::HouseWeekInfo;
use mh_core::identity::Actor;
use mh_core::ids::{HouseId, HouseWeekInfoId};
use mh_core::requests::{CreateWeekInfoRequest, UpdateWeekInfoRequest};
use mh_core::values::{DateSpan, WeekStartDate};
use tokio_util::sync::CancellationToken;

use crate::DbRows;
use crate::error::DatabaseError;
use crate::helpers::{format_date, parse_date, parse_enum};
use crate::service::MhService;
use crate::tracking::ChangeTracker;

const WEEK_COLUMNS: &str = "id, house_id, start_date, status, on_time";

fn row_to_week_info(row: &libsql::Row) -> Result<HouseWeekInfo, DatabaseError> {
    Ok(HouseWeekInfo {
        id: Some(HouseWeekInfoId(row.get::<i64>(0)?)),
        house_id: HouseId(row.get::<String>(1)?),
        start_date: parse_date(&row.get::<String>(2)?)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        on_time: row.get::<i64>(4)? != 0,
    })
}

async fn collect_weeks(mut rows: DbRows<'_>) -> Result<Vec<HouseWeekInfo>, DatabaseError> {
    let mut weeks = Vec::new();
    while let Some(row) = rows.next().await? {
        weeks.push(row_to_week_info(&row)?);
    }
    Ok(weeks)
}

impl MhService {
    /// # Errors
    ///
    /// `NotFound` if the house does not exist, `Validation` for an early date.
    pub async fn create_week_info(
        &self,
        request: CreateWeekInfoRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<HouseWeekInfo, DatabaseError> {
        let start = WeekStartDate::new(request.start_date)?;
        self.get_house(&request.house_id).await?;

        let mut uow = ChangeTracker::new();
        let entry = uow.add(HouseWeekInfo::new(
            request.house_id,
            start,
            request.status,
            request.on_time,
        ));
        self.save_changes(&mut uow, actor, cancel).await?;

        uow.entity::<HouseWeekInfo>(entry)
            .cloned()
            .ok_or_else(|| DatabaseError::InvalidState("saved week missing from tracker".into()))
    }

    /// # Errors
    ///
    /// `NotFound` if the week info does not exist.
    pub async fn update_week_info(
        &self,
        request: UpdateWeekInfoRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<HouseWeekInfo, DatabaseError> {
        let start = WeekStartDate::new(request.start_date)?;
        let week = self.get_week_info(request.id).await?;

        let mut uow = ChangeTracker::new();
        let entry = uow.attach(week);
        let week = uow
            .entity_mut::<HouseWeekInfo>(entry)
            .ok_or_else(|| DatabaseError::InvalidState("attached week missing".into()))?;
        week.change_start_date(start);
        week.change_status(request.status);
        week.change_on_time(request.on_time);
        self.save_changes(&mut uow, actor, cancel).await?;

        self.get_week_info(request.id).await
    }

    /// Delete a week info; its marks are removed by the database.
    ///
    /// # Errors
    ///
    /// `NotFound` if the week info does not exist.
    pub async fn delete_week_info(
        &self,
        id: HouseWeekInfoId,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        let week = self.get_week_info(id).await?;
        let mut uow = ChangeTracker::new();
        let entry = uow.attach(week);
        uow.remove(entry)?;
        self.save_changes(&mut uow, actor, cancel).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// `NotFound` if the week info does not exist.
    pub async fn get_week_info(&self, id: HouseWeekInfoId) -> Result<HouseWeekInfo, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {WEEK_COLUMNS} FROM house_week_infos WHERE id = ?1"),
                [id.value()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("HouseWeekInfo", id))?;
        row_to_week_info(&row)
    }

    /// # Errors
    ///
    /// `NotFound` if the house does not exist.
    pub async fn list_week_infos_for_house(
        &self,
        house_id: &HouseId,
    ) -> Result<Vec<HouseWeekInfo>, DatabaseError> {
        self.get_house(house_id).await?;
        let rows = self
            .db()
            .query(
                &format!(
                    "SELECT {WEEK_COLUMNS} FROM house_week_infos
                     WHERE house_id = ?1 ORDER BY start_date, id"
                ),
                [house_id.as_str()],
            )
            .await?;
        collect_weeks(rows).await
    }

    /// Week infos starting inside `span`, optionally for one house.
    pub async fn list_week_infos_in_range(
        &self,
        span: DateSpan,
        house_id: Option<&HouseId>,
    ) -> Result<Vec<HouseWeekInfo>, DatabaseError> {
        let end = span.end.map_or_else(|| "9999-12-31".to_string(), format_date);
        let rows = self
            .db()
            .query(
                &format!(
                    "SELECT {WEEK_COLUMNS} FROM house_week_infos
                     WHERE start_date >= ?1 AND start_date <= ?2
                       AND (?3 IS NULL OR house_id = ?3)
                     ORDER BY start_date, id"
                ),
                libsql::params![format_date(span.start), end, house_id.map(HouseId::as_str)],
            )
            .await?;
        collect_weeks(rows).await
    }
}
