use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::HouseStatus;
use crate::ids::HouseId;
use crate::values::{Brigade, DateSpan, HouseMetrics, Point};

/// A house under construction. The root of every history query.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct House {
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
}

impl House {
    #[must_use]
    pub fn new(
        id: HouseId,
        metrics: HouseMetrics,
        position: Point,
        current_state: HouseStatus,
        documents_terms: DateSpan,
        brigade: Brigade,
    ) -> Self {
        Self {
            id,
            length: metrics.length,
            width: metrics.width,
            top_left_corner_x: position.x,
            top_left_corner_y: position.y,
            current_state,
            official_start_date: documents_terms.start,
            official_end_date: documents_terms.end,
            real_start_date: None,
            real_end_date: None,
            brigade: brigade.into_inner(),
        }
    }

    pub fn change_brigade(&mut self, brigade: Brigade) {
        self.brigade = brigade.into_inner();
    }

    pub const fn change_position(&mut self, position: Point) {
        self.top_left_corner_x = position.x;
        self.top_left_corner_y = position.y;
    }

    pub const fn change_metrics(&mut self, metrics: HouseMetrics) {
        self.length = metrics.length;
        self.width = metrics.width;
    }

    pub const fn change_state(&mut self, state: HouseStatus) {
        self.current_state = state;
    }

    pub const fn change_documents_terms(&mut self, terms: DateSpan) {
        self.official_start_date = terms.start;
        self.official_end_date = terms.end;
    }

    /// Set or clear the actual construction dates.
    pub fn change_real_terms(&mut self, terms: Option<DateSpan>) {
        self.real_start_date = terms.map(|t| t.start);
        self.real_end_date = terms.and_then(|t| t.end);
    }

    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.top_left_corner_x, self.top_left_corner_y)
    }
}
