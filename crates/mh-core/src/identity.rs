use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Who is making a change.
///
/// Produced by `mh-auth` from the request's bearer token and passed
/// explicitly into every save so that audit records can be attributed.
/// `author_id == None` marks a system or unauthenticated change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Actor {
    pub author_id: Option<String>,
}

impl Actor {
    /// Actor for changes with no authenticated user.
    #[must_use]
    pub const fn system() -> Self {
        Self { author_id: None }
    }

    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            author_id: Some(id.into()),
        }
    }

    #[must_use]
    pub const fn is_system(&self) -> bool {
        self.author_id.is_none()
    }
}
