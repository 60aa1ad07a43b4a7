//! Strongly typed entity IDs and ID constants.
//!
//! Houses are keyed by their user-supplied model name. Every other entity
//! gets an integer key from the database on insert, so freshly constructed
//! entities carry `None` until the first successful save.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prefix for audit record IDs (`aud-` + 16 hex chars).
pub const PREFIX_AUDIT: &str = "aud";

/// Record ID written when an entity's key cannot be resolved after save.
pub const UNKNOWN_KEY: &str = "UnknownKey";

/// House model name. Unique and user supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct HouseId(pub String);

impl HouseId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HouseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

macro_rules! generated_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

generated_id!(
    /// Structural post key.
    PostId
);
generated_id!(
    /// House–post link key.
    HousePostId
);
generated_id!(
    /// Weekly progress entry key.
    HouseWeekInfoId
);
generated_id!(
    /// Week mark key.
    WeekMarkId
);
