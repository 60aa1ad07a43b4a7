use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::MarkType;
use crate::ids::{HouseWeekInfoId, WeekMarkId};
use crate::values::MarkComment;

/// Quality or issue note attached to a week.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WeekMark {
    pub id: Option<WeekMarkId>,
    pub house_week_info_id: HouseWeekInfoId,
    pub mark_type: MarkType,
    pub comment: String,
}

impl WeekMark {
    #[must_use]
    pub fn new(house_week_info_id: HouseWeekInfoId, mark_type: MarkType, comment: MarkComment) -> Self {
        Self {
            id: None,
            house_week_info_id,
            mark_type,
            comment: comment.into_inner(),
        }
    }

    pub fn change_comment(&mut self, comment: MarkComment) {
        self.comment = comment.into_inner();
    }

    pub const fn change_mark_type(&mut self, mark_type: MarkType) {
        self.mark_type = mark_type;
    }
}
