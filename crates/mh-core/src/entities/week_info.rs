use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::WeekStatus;
use crate::ids::{HouseId, HouseWeekInfoId};
use crate::values::WeekStartDate;

/// Progress entry for one construction week of a house.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HouseWeekInfo {
    pub id: Option<HouseWeekInfoId>,
    pub house_id: HouseId,
    pub start_date: NaiveDate,
    pub status: WeekStatus,
    pub on_time: bool,
}

impl HouseWeekInfo {
    #[must_use]
    pub fn new(
        house_id: HouseId,
        start_date: WeekStartDate,
        status: WeekStatus,
        on_time: bool,
    ) -> Self {
        Self {
            id: None,
            house_id,
            start_date: start_date.date(),
            status,
            on_time,
        }
    }

    pub const fn change_start_date(&mut self, start_date: WeekStartDate) {
        self.start_date = start_date.date();
    }

    pub const fn change_status(&mut self, status: WeekStatus) {
        self.status = status;
    }

    pub const fn change_on_time(&mut self, on_time: bool) {
        self.on_time = on_time;
    }
}
