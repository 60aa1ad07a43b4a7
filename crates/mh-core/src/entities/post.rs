use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::PostId;
use crate::values::PostName;

/// A structural post that can be assigned to houses. Names are unique.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Post {
    /// `None` until the first save assigns a key.
    pub id: Option<PostId>,
    pub name: String,
    pub area: f64,
}

impl Post {
    /// Negative areas are stored as zero.
    #[must_use]
    pub fn new(name: PostName, area: f64) -> Self {
        Self {
            id: None,
            name: name.into_inner(),
            area: area.max(0.0),
        }
    }

    pub fn rename(&mut self, name: PostName) {
        self.name = name.into_inner();
    }

    pub fn change_area(&mut self, area: f64) {
        self.area = area.max(0.0);
    }
}
