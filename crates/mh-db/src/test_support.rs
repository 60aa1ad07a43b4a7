//! Shared fixtures for mh-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::NaiveDate;
    use mh_core::enums::{HouseStatus, WeekStatus};
    use mh_core::identity::Actor;
    use mh_core::ids::{HouseId, HouseWeekInfoId};
    use mh_core::requests::{CreateHouseRequest, CreateWeekInfoRequest};
    use tokio_util::sync::CancellationToken;

    use crate::MhDb;
    use crate::service::MhService;

    pub async fn test_service() -> MhService {
        let db = MhDb::open_local(":memory:").await.unwrap();
        MhService::from_db(db)
    }

    pub fn create_request(id: &str) -> CreateHouseRequest {
        CreateHouseRequest {
            id: HouseId::new(id),
            length: 10.0,
            width: 8.0,
            top_left_corner_x: -5,
            top_left_corner_y: 5,
            current_state: HouseStatus::Planned,
            official_start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            official_end_date: None,
            brigade: "Alpha".into(),
            post_ids: Vec::new(),
        }
    }

    /// Create house `id` with the default request, as the system actor.
    pub async fn seeded_house(svc: &MhService, id: &str) {
        svc.create_house(create_request(id), &Actor::system(), &CancellationToken::new())
            .await
            .unwrap();
    }

    pub async fn seeded_week(svc: &MhService, house: &str) -> HouseWeekInfoId {
        svc.create_week_info(
            CreateWeekInfoRequest {
                house_id: HouseId::new(house),
                start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
                status: WeekStatus::NotStarted,
                on_time: true,
            },
            &Actor::system(),
            &CancellationToken::new(),
        )
        .await
        .unwrap()
        .id
        .unwrap()
    }
}
