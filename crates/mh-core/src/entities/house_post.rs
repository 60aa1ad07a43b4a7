use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::{HouseId, HousePostId, PostId};

/// Assignment of a post to a house.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HousePost {
    pub id: Option<HousePostId>,
    pub house_id: HouseId,
    pub post_id: PostId,
}

impl HousePost {
    #[must_use]
    pub fn new(house_id: HouseId, post_id: PostId) -> Self {
        Self {
            id: None,
            house_id,
            post_id,
        }
    }
}
