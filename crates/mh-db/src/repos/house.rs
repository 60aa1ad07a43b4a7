//! House repository: CRUD, range queries and house–post links.

use std::collections::BTreeSet;

use mh_core::entities::{House, HousePost, Post};
use mh_core::enums::HouseStatus;
use mh_core::identity::Actor;
use mh_core::ids::{HouseId, HousePostId, PostId};
use mh_core::requests::{CreateHouseRequest, UpdateHouseRequest};
use mh_core::values::{Brigade, DateSpan, HouseMetrics, Point};
use tokio_util::sync::CancellationToken;

use crate::DbRows;
use crate::error::DatabaseError;
use crate::helpers::{format_date, get_opt_date, parse_date, parse_enum, placeholders};
use crate::repos::post::row_to_post;
use crate::service::MhService;
use crate::tracking::ChangeTracker;

const HOUSE_COLUMNS: &str = "id, length, width, top_left_corner_x, top_left_corner_y, current_state,
     official_start_date, official_end_date, real_start_date, real_end_date, brigade";

fn row_to_house(row: &libsql::Row) -> Result<House, DatabaseError> {
    Ok(House {
        id: HouseId(row.get::<String>(0)?),
        length: row.get::<f64>(1)?,
        width: row.get::<f64>(2)?,
        top_left_corner_x: row.get::<i64>(3)?,
        top_left_corner_y: row.get::<i64>(4)?,
        current_state: parse_enum(&row.get::<String>(5)?)?,
        official_start_date: parse_date(&row.get::<String>(6)?)?,
        official_end_date: get_opt_date(row, 7)?,
        real_start_date: get_opt_date(row, 8)?,
        real_end_date: get_opt_date(row, 9)?,
        brigade: row.get::<String>(10)?,
    })
}

fn row_to_house_post(row: &libsql::Row) -> Result<HousePost, DatabaseError> {
    Ok(HousePost {
        id: Some(HousePostId(row.get::<i64>(0)?)),
        house_id: HouseId(row.get::<String>(1)?),
        post_id: PostId(row.get::<i64>(2)?),
    })
}

/// Real construction dates are optional, but an end needs a start.
fn real_terms(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> Result<Option<DateSpan>, DatabaseError> {
    match (start, end) {
        (Some(start), end) => Ok(Some(DateSpan::new(start, end)?)),
        (None, None) => Ok(None),
        (None, Some(_)) => Err(DatabaseError::Validation(
            "Real end date requires a real start date".into(),
        )),
    }
}

fn validate_model(id: &HouseId) -> Result<(), DatabaseError> {
    if id.as_str().trim().is_empty() {
        return Err(DatabaseError::Validation("House model must not be empty".into()));
    }
    Ok(())
}

async fn collect_houses(mut rows: DbRows<'_>) -> Result<Vec<House>, DatabaseError> {
    let mut houses = Vec::new();
    while let Some(row) = rows.next().await? {
        houses.push(row_to_house(&row)?);
    }
    Ok(houses)
}

impl MhService {
    /// Create a house and link it to `post_ids` in one audited save.
    ///
    /// # Errors
    ///
    /// `Validation` for bad input, `AlreadyExists` if the model is taken,
    /// `NotFound` if a post does not exist.
    pub async fn create_house(
        &self,
        request: CreateHouseRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<House, DatabaseError> {
        validate_model(&request.id)?;
        let metrics = HouseMetrics::new(request.length, request.width)?;
        let terms = DateSpan::new(request.official_start_date, request.official_end_date)?;
        let brigade = Brigade::new(&request.brigade)?;

        if self.find_house(&request.id).await?.is_some() {
            return Err(DatabaseError::already_exists("House", &request.id));
        }
        let post_ids: BTreeSet<PostId> = request.post_ids.into_iter().collect();
        self.ensure_posts_exist(&post_ids).await?;

        let mut uow = ChangeTracker::new();
        uow.add(House::new(
            request.id.clone(),
            metrics,
            Point::new(request.top_left_corner_x, request.top_left_corner_y),
            request.current_state,
            terms,
            brigade,
        ));
        for post_id in post_ids {
            uow.add(HousePost::new(request.id.clone(), post_id));
        }
        self.save_changes(&mut uow, actor, cancel).await?;

        self.get_house(&request.id).await
    }

    /// Apply all fields of `request` and reconcile the house's post links:
    /// links to posts no longer listed are removed, new ones are added.
    ///
    /// # Errors
    ///
    /// `NotFound` if the house or a post does not exist, `Validation` for bad input.
    pub async fn update_house(
        &self,
        request: UpdateHouseRequest,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<House, DatabaseError> {
        let metrics = HouseMetrics::new(request.length, request.width)?;
        let terms = DateSpan::new(request.official_start_date, request.official_end_date)?;
        let real = real_terms(request.real_start_date, request.real_end_date)?;
        let brigade = Brigade::new(&request.brigade)?;

        let house = self.get_house(&request.id).await?;
        let links = self.list_house_posts(&request.id).await?;
        let wanted: BTreeSet<PostId> = request.post_ids.into_iter().collect();
        self.ensure_posts_exist(&wanted).await?;

        let mut uow = ChangeTracker::new();
        let entry = uow.attach(house);
        let house = uow
            .entity_mut::<House>(entry)
            .ok_or_else(|| DatabaseError::InvalidState("attached house missing".into()))?;
        house.change_metrics(metrics);
        house.change_position(Point::new(request.top_left_corner_x, request.top_left_corner_y));
        house.change_state(request.current_state);
        house.change_documents_terms(terms);
        house.change_real_terms(real);
        house.change_brigade(brigade);

        let linked: BTreeSet<PostId> = links.iter().map(|l| l.post_id).collect();
        for link in links {
            if !wanted.contains(&link.post_id) {
                let id = uow.attach(link);
                uow.remove(id)?;
            }
        }
        for post_id in wanted.difference(&linked) {
            uow.add(HousePost::new(request.id.clone(), *post_id));
        }

        self.save_changes(&mut uow, actor, cancel).await?;
        self.get_house(&request.id).await
    }

    /// Delete a house. Its links and week infos go with it at the storage
    /// level; only the house itself is audited.
    ///
    /// # Errors
    ///
    /// `NotFound` if the house does not exist.
    pub async fn delete_house(
        &self,
        id: &HouseId,
        actor: &Actor,
        cancel: &CancellationToken,
    ) -> Result<(), DatabaseError> {
        let house = self.get_house(id).await?;
        let mut uow = ChangeTracker::new();
        let entry = uow.attach(house);
        uow.remove(entry)?;
        self.save_changes(&mut uow, actor, cancel).await?;
        Ok(())
    }

    pub async fn find_house(&self, id: &HouseId) -> Result<Option<House>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {HOUSE_COLUMNS} FROM houses WHERE id = ?1"),
                [id.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_house(&row)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// `NotFound` if no house has this model.
    pub async fn get_house(&self, id: &HouseId) -> Result<House, DatabaseError> {
        self.find_house(id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("House", id))
    }

    pub async fn list_houses(&self) -> Result<Vec<House>, DatabaseError> {
        let rows = self
            .db()
            .query(&format!("SELECT {HOUSE_COLUMNS} FROM houses ORDER BY id"), ())
            .await?;
        collect_houses(rows).await
    }

    pub async fn list_houses_by_state(
        &self,
        state: HouseStatus,
    ) -> Result<Vec<House>, DatabaseError> {
        let rows = self
            .db()
            .query(
                &format!("SELECT {HOUSE_COLUMNS} FROM houses WHERE current_state = ?1 ORDER BY id"),
                [state.as_str()],
            )
            .await?;
        collect_houses(rows).await
    }

    /// Houses whose official term lies inside `span`. An open `span` end is
    /// unbounded; houses without an official end date never match.
    pub async fn list_houses_in_range(&self, span: DateSpan) -> Result<Vec<House>, DatabaseError> {
        let end = span.end.map_or_else(|| "9999-12-31".to_string(), format_date);
        let rows = self
            .db()
            .query(
                &format!(
                    "SELECT {HOUSE_COLUMNS} FROM houses
                     WHERE official_start_date >= ?1 AND official_end_date <= ?2
                     ORDER BY official_start_date, id"
                ),
                libsql::params![format_date(span.start), end],
            )
            .await?;
        collect_houses(rows).await
    }

    pub async fn list_house_posts(
        &self,
        house_id: &HouseId,
    ) -> Result<Vec<HousePost>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT id, house_id, post_id FROM house_posts WHERE house_id = ?1 ORDER BY id",
                [house_id.as_str()],
            )
            .await?;
        let mut links = Vec::new();
        while let Some(row) = rows.next().await? {
            links.push(row_to_house_post(&row)?);
        }
        Ok(links)
    }

    /// Posts assigned to a house.
    pub async fn list_posts_for_house(
        &self,
        house_id: &HouseId,
    ) -> Result<Vec<Post>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT p.id, p.name, p.area FROM posts p
                 JOIN house_posts hp ON hp.post_id = p.id
                 WHERE hp.house_id = ?1 ORDER BY p.id",
                [house_id.as_str()],
            )
            .await?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next().await? {
            posts.push(row_to_post(&row)?);
        }
        Ok(posts)
    }

    async fn ensure_posts_exist(&self, ids: &BTreeSet<PostId>) -> Result<(), DatabaseError> {
        if ids.is_empty() {
            return Ok(());
        }
        let params: Vec<libsql::Value> = ids.iter().map(|id| libsql::Value::Integer(id.value())).collect();
        let mut rows = self
            .db()
            .query(
                &format!(
                    "SELECT id FROM posts WHERE id IN ({})",
                    placeholders(1, params.len())
                ),
                libsql::params_from_iter(params),
            )
            .await?;
        let mut found = BTreeSet::new();
        while let Some(row) = rows.next().await? {
            found.insert(PostId(row.get::<i64>(0)?));
        }
        match ids.difference(&found).next() {
            Some(missing) => Err(DatabaseError::not_found("Post", missing)),
            None => Ok(()),
        }
    }
}
