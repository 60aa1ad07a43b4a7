//! Status enums and audit operation kinds for mhouse.
//!
//! Domain enums use `snake_case` serialization and SQL storage, and their
//! variant names (`label`) in audit values. Audit operations keep their
//! capitalized names (`Create`, `Update`, `Delete`)
//! because they are shown verbatim in history responses.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// HouseStatus
// ---------------------------------------------------------------------------

/// Construction stage of a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HouseStatus {
    Planned,
    HasTechnicalAssigment,
    HasDesignSolution,
    InProcess,
    Finished,
}

impl HouseStatus {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::HasTechnicalAssigment => "has_technical_assigment",
            Self::HasDesignSolution => "has_design_solution",
            Self::InProcess => "in_process",
            Self::Finished => "finished",
        }
    }

    /// Variant name as shown in audit values, e.g. `HasTechnicalAssigment`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::HasTechnicalAssigment => "HasTechnicalAssigment",
            Self::HasDesignSolution => "HasDesignSolution",
            Self::InProcess => "InProcess",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for HouseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HouseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(Self::Planned),
            "has_technical_assigment" => Ok(Self::HasTechnicalAssigment),
            "has_design_solution" => Ok(Self::HasDesignSolution),
            "in_process" => Ok(Self::InProcess),
            "finished" => Ok(Self::Finished),
            other => Err(CoreError::UnknownVariant {
                kind: "house status",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// WeekStatus
// ---------------------------------------------------------------------------

/// Progress status recorded for one construction week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeekStatus {
    NotStarted,
    InProcess,
    OnHold,
    Finished,
}

impl WeekStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProcess => "in_process",
            Self::OnHold => "on_hold",
            Self::Finished => "finished",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProcess => "InProcess",
            Self::OnHold => "OnHold",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for WeekStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_process" => Ok(Self::InProcess),
            "on_hold" => Ok(Self::OnHold),
            "finished" => Ok(Self::Finished),
            other => Err(CoreError::UnknownVariant {
                kind: "week status",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MarkType
// ---------------------------------------------------------------------------

/// Category of a week mark: red for issues, blue for general notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarkType {
    RedMark,
    BlueMark,
}

impl MarkType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RedMark => "red_mark",
            Self::BlueMark => "blue_mark",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RedMark => "RedMark",
            Self::BlueMark => "BlueMark",
        }
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red_mark" => Ok(Self::RedMark),
            "blue_mark" => Ok(Self::BlueMark),
            other => Err(CoreError::UnknownVariant {
                kind: "mark type",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditOperation
// ---------------------------------------------------------------------------

/// Kind of mutation recorded by an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AuditOperation {
    Create,
    Update,
    Delete,
}

impl AuditOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditOperation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Create" => Ok(Self::Create),
            "Update" => Ok(Self::Update),
            "Delete" => Ok(Self::Delete),
            other => Err(CoreError::UnknownVariant {
                kind: "audit operation",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
