//! Entity metadata registry and the `Entity` impls for every domain entity.

use mh_core::entities::{House, HousePost, HouseWeekInfo, Post, WeekMark};
use mh_core::ids::{HousePostId, HouseWeekInfoId, PostId, WeekMarkId};

use super::{Entity, EntityMeta, FieldValue, PropertyMeta, TrackedEntity};

const fn prop(name: &'static str, column: &'static str) -> PropertyMeta {
    PropertyMeta { name, column }
}

const ID: PropertyMeta = prop("Id", "id");

/// Every entity kind the audit subsystem knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    House,
    Post,
    HousePost,
    WeekInfo,
    WeekMark,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::House,
        Self::Post,
        Self::HousePost,
        Self::WeekInfo,
        Self::WeekMark,
    ];

    #[must_use]
    pub fn meta(self) -> &'static EntityMeta {
        match self {
            Self::House => &HOUSE,
            Self::Post => &POST,
            Self::HousePost => &HOUSE_POST,
            Self::WeekInfo => &HOUSE_WEEK_INFO,
            Self::WeekMark => &WEEK_MARK,
        }
    }

    #[must_use]
    pub fn table_name(self) -> &'static str {
        self.meta().table_name
    }

    /// Depth in the foreign-key graph. Inserts run in ascending rank,
    /// deletes in descending rank.
    #[must_use]
    pub const fn save_rank(self) -> u8 {
        match self {
            Self::House | Self::Post => 0,
            Self::HousePost | Self::WeekInfo => 1,
            Self::WeekMark => 2,
        }
    }
}

pub static HOUSE: EntityMeta = EntityMeta {
    kind: EntityKind::House,
    table_name: "Houses",
    sql_table: "houses",
    key: ID,
    generated_key: false,
    properties: &[
        prop("Length", "length"),
        prop("Width", "width"),
        prop("TopLeftCornerX", "top_left_corner_x"),
        prop("TopLeftCornerY", "top_left_corner_y"),
        prop("CurrentState", "current_state"),
        prop("OfficialStartDate", "official_start_date"),
        prop("OfficialEndDate", "official_end_date"),
        prop("RealStartDate", "real_start_date"),
        prop("RealEndDate", "real_end_date"),
        prop("Brigade", "brigade"),
    ],
};

pub static POST: EntityMeta = EntityMeta {
    kind: EntityKind::Post,
    table_name: "Posts",
    sql_table: "posts",
    key: ID,
    generated_key: true,
    properties: &[prop("Name", "name"), prop("Area", "area")],
};

pub static HOUSE_POST: EntityMeta = EntityMeta {
    kind: EntityKind::HousePost,
    table_name: "HousePosts",
    sql_table: "house_posts",
    key: ID,
    generated_key: true,
    properties: &[prop("HouseId", "house_id"), prop("PostId", "post_id")],
};

pub static HOUSE_WEEK_INFO: EntityMeta = EntityMeta {
    kind: EntityKind::WeekInfo,
    table_name: "HouseWeekInfos",
    sql_table: "house_week_infos",
    key: ID,
    generated_key: true,
    properties: &[
        prop("HouseId", "house_id"),
        prop("StartDate", "start_date"),
        prop("Status", "status"),
        prop("OnTime", "on_time"),
    ],
};

pub static WEEK_MARK: EntityMeta = EntityMeta {
    kind: EntityKind::WeekMark,
    table_name: "WeekMarks",
    sql_table: "week_marks",
    key: ID,
    generated_key: true,
    properties: &[
        prop("HouseWeekInfoId", "house_week_info_id"),
        prop("MarkType", "mark_type"),
        prop("Comment", "comment"),
    ],
};

// ---------------------------------------------------------------------------
// Entity impls
// ---------------------------------------------------------------------------

macro_rules! tracked_variant {
    ($variant:ident) => {
        fn into_tracked(self) -> TrackedEntity {
            TrackedEntity::$variant(self)
        }

        fn from_tracked(tracked: &TrackedEntity) -> Option<&Self> {
            match tracked {
                TrackedEntity::$variant(e) => Some(e),
                _ => None,
            }
        }

        fn from_tracked_mut(tracked: &mut TrackedEntity) -> Option<&mut Self> {
            match tracked {
                TrackedEntity::$variant(e) => Some(e),
                _ => None,
            }
        }
    };
}

impl Entity for House {
    const KIND: EntityKind = EntityKind::House;

    fn key(&self) -> Option<FieldValue> {
        Some(FieldValue::Text(self.id.to_string())).filter(|_| !self.id.as_str().is_empty())
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Real(self.length),
            FieldValue::Real(self.width),
            FieldValue::Integer(self.top_left_corner_x),
            FieldValue::Integer(self.top_left_corner_y),
            FieldValue::Enum {
                stored: self.current_state.as_str(),
                label: self.current_state.label(),
            },
            FieldValue::Date(self.official_start_date),
            self.official_end_date.into(),
            self.real_start_date.into(),
            self.real_end_date.into(),
            FieldValue::Text(self.brigade.clone()),
        ]
    }

    fn assign_generated_key(&mut self, _key: Option<i64>) {}

    tracked_variant!(House);
}

impl Entity for Post {
    const KIND: EntityKind = EntityKind::Post;

    fn key(&self) -> Option<FieldValue> {
        self.id.map(|id| FieldValue::Integer(id.value()))
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Text(self.name.clone()), FieldValue::Real(self.area)]
    }

    fn assign_generated_key(&mut self, key: Option<i64>) {
        self.id = key.map(PostId);
    }

    tracked_variant!(Post);
}

impl Entity for HousePost {
    const KIND: EntityKind = EntityKind::HousePost;

    fn key(&self) -> Option<FieldValue> {
        self.id.map(|id| FieldValue::Integer(id.value()))
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.house_id.to_string()),
            FieldValue::Integer(self.post_id.value()),
        ]
    }

    fn assign_generated_key(&mut self, key: Option<i64>) {
        self.id = key.map(HousePostId);
    }

    tracked_variant!(HousePost);
}

impl Entity for HouseWeekInfo {
    const KIND: EntityKind = EntityKind::WeekInfo;

    fn key(&self) -> Option<FieldValue> {
        self.id.map(|id| FieldValue::Integer(id.value()))
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.house_id.to_string()),
            FieldValue::Date(self.start_date),
            FieldValue::Enum {
                stored: self.status.as_str(),
                label: self.status.label(),
            },
            FieldValue::Bool(self.on_time),
        ]
    }

    fn assign_generated_key(&mut self, key: Option<i64>) {
        self.id = key.map(HouseWeekInfoId);
    }

    tracked_variant!(WeekInfo);
}

impl Entity for WeekMark {
    const KIND: EntityKind = EntityKind::WeekMark;

    fn key(&self) -> Option<FieldValue> {
        self.id.map(|id| FieldValue::Integer(id.value()))
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Integer(self.house_week_info_id.value()),
            FieldValue::Enum {
                stored: self.mark_type.as_str(),
                label: self.mark_type.label(),
            },
            FieldValue::Text(self.comment.clone()),
        ]
    }

    fn assign_generated_key(&mut self, key: Option<i64>) {
        self.id = key.map(WeekMarkId);
    }

    tracked_variant!(WeekMark);
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mh_core::enums::{HouseStatus, MarkType};
    use mh_core::ids::HouseId;
    use mh_core::values::{Brigade, DateSpan, HouseMetrics, MarkComment, Point};

    use super::*;

    fn house() -> House {
        House::new(
            HouseId::new("H1"),
            HouseMetrics::new(10.0, 8.0).unwrap(),
            Point::new(-5, 5),
            HouseStatus::Planned,
            DateSpan::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), None).unwrap(),
            Brigade::new("Alpha").unwrap(),
        )
    }

    #[test]
    fn values_align_with_properties() {
        for kind in EntityKind::ALL {
            let meta = kind.meta();
            assert_eq!(meta.kind, kind);
            assert!(
                meta.properties.iter().all(|p| p.name != meta.key.name),
                "{} lists its key as a property",
                meta.table_name
            );
        }

        assert_eq!(house().values().len(), HOUSE.properties.len());
        let mark = WeekMark::new(
            HouseWeekInfoId(1),
            MarkType::RedMark,
            MarkComment::new("crack").unwrap(),
        );
        assert_eq!(mark.values().len(), WEEK_MARK.properties.len());
        assert_eq!(
            Post::new(mh_core::values::PostName::new("P").unwrap(), 1.0)
                .values()
                .len(),
            POST.properties.len()
        );
    }

    #[test]
    fn natural_key_ignores_generated_assignment() {
        let mut h = house();
        h.assign_generated_key(Some(9));
        assert_eq!(h.key(), Some(FieldValue::Text("H1".into())));
    }

    #[test]
    fn generated_key_roundtrip() {
        let mut mark = WeekMark::new(
            HouseWeekInfoId(1),
            MarkType::BlueMark,
            MarkComment::new("ok").unwrap(),
        );
        assert_eq!(mark.key(), None);
        mark.assign_generated_key(Some(4));
        assert_eq!(mark.id, Some(WeekMarkId(4)));
        mark.assign_generated_key(None);
        assert_eq!(mark.key(), None);
    }

    #[test]
    fn tracked_downcast_matches_variant() {
        let tracked = house().into_tracked();
        assert_eq!(tracked.kind(), EntityKind::House);
        assert!(House::from_tracked(&tracked).is_some());
        assert!(Post::from_tracked(&tracked).is_none());
    }

    #[test]
    fn parents_save_before_children() {
        assert!(EntityKind::House.save_rank() < EntityKind::WeekInfo.save_rank());
        assert!(EntityKind::WeekInfo.save_rank() < EntityKind::WeekMark.save_rank());
        assert!(EntityKind::Post.save_rank() < EntityKind::HousePost.save_rank());
    }
}
