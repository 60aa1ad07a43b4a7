//! Input shapes for business writes.
//!
//! Raw values are validated into value objects by the repositories before
//! anything is tracked.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{HouseStatus, MarkType, WeekStatus};
use crate::ids::{HouseId, HouseWeekInfoId, PostId, WeekMarkId};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CreateHouseRequest {
    pub id: HouseId,
    pub length: f64,
    pub width: f64,
    pub top_left_corner_x: i64,
    pub top_left_corner_y: i64,
    pub current_state: HouseStatus,
    pub official_start_date: NaiveDate,
    pub official_end_date: Option<NaiveDate>,
    pub brigade: String,
    #[serde(default)]
    pub post_ids: Vec<PostId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct UpdateHouseRequest {
    pub id: HouseId,
    pub length: f64,
    pub width: f64,
    pub top_left_corner_x: i64,
    pub top_left_corner_y: i64,
    pub current_state: HouseStatus,
    pub official_start_date: NaiveDate,
    pub official_end_date: Option<NaiveDate>,
    pub real_start_date: Option<NaiveDate>,
    pub real_end_date: Option<NaiveDate>,
    pub brigade: String,
    #[serde(default)]
    pub post_ids: Vec<PostId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct UpdatePostRequest {
    pub id: PostId,
    pub name: String,
    pub area: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CreateWeekInfoRequest {
    pub house_id: HouseId,
    pub start_date: NaiveDate,
    pub status: WeekStatus,
    pub on_time: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UpdateWeekInfoRequest {
    pub id: HouseWeekInfoId,
    pub start_date: NaiveDate,
    pub status: WeekStatus,
    pub on_time: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CreateWeekMarkRequest {
    pub house_week_info_id: HouseWeekInfoId,
    pub mark_type: MarkType,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UpdateWeekMarkRequest {
    pub id: WeekMarkId,
    pub mark_type: MarkType,
    pub comment: String,
}
