//! Unit-of-work change tracking.
//!
//! Entities are registered with a [`ChangeTracker`] as added, attached
//! (loaded and unchanged) or removed. Before a save the tracker compares
//! every attached entity against the values captured when it was attached,
//! and [`snapshot::extract`] turns the pending changes into per-entity
//! snapshots with field diffs. [`builder`] completes those snapshots into
//! audit records once the primary write has assigned keys.
//!
//! There is no reflection: every entity kind describes its table, key and
//! persisted properties in a const [`EntityMeta`] (see [`registry`]).

pub mod builder;
pub mod registry;
pub mod snapshot;
pub mod tracker;

use std::fmt;

use chrono::NaiveDate;
use mh_core::entities::{House, HousePost, HouseWeekInfo, Post, WeekMark};

use crate::helpers::format_date;

pub use registry::EntityKind;
pub use tracker::{ChangeTracker, EntityState, EntryId};

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Storage-neutral value of one persisted property.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Date(NaiveDate),
    /// Stored as `stored`, shown in audit values as `label`.
    Enum {
        stored: &'static str,
        label: &'static str,
    },
}

impl FieldValue {
    /// Audit rendering: `None` for SQL NULL, otherwise the display form.
    #[must_use]
    pub fn to_audit_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => f.write_str(&format_date(*d)),
            Self::Enum { label, .. } => f.write_str(label),
        }
    }
}

impl From<&FieldValue> for libsql::Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => Self::Null,
            FieldValue::Text(s) => Self::Text(s.clone()),
            FieldValue::Integer(i) => Self::Integer(*i),
            FieldValue::Real(r) => Self::Real(*r),
            FieldValue::Bool(b) => Self::Integer(i64::from(*b)),
            FieldValue::Date(d) => Self::Text(format_date(*d)),
            FieldValue::Enum { stored, .. } => Self::Text((*stored).to_string()),
        }
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Null, Self::Date)
    }
}

// ---------------------------------------------------------------------------
// Entity metadata
// ---------------------------------------------------------------------------

/// One persisted property: logical (audit) name and SQL column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyMeta {
    pub name: &'static str,
    pub column: &'static str,
}

/// Static description of how an entity kind is stored and audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityMeta {
    pub kind: EntityKind,
    /// Logical collection name written to `audits.table_name`.
    pub table_name: &'static str,
    pub sql_table: &'static str,
    pub key: PropertyMeta,
    /// Whether the database assigns the key on insert.
    pub generated_key: bool,
    /// Persisted scalar properties, key excluded, in `Entity::values` order.
    pub properties: &'static [PropertyMeta],
}

/// Narrow persistence contract implemented by every tracked entity.
pub trait Entity: Sized {
    const KIND: EntityKind;

    /// Primary key, `None` while a generated key is unassigned.
    fn key(&self) -> Option<FieldValue>;

    /// Current property values, aligned with `EntityMeta::properties`.
    fn values(&self) -> Vec<FieldValue>;

    /// Store a database-generated key; `None` clears it. No-op for
    /// entities with natural keys.
    fn assign_generated_key(&mut self, key: Option<i64>);

    fn into_tracked(self) -> TrackedEntity;
    fn from_tracked(tracked: &TrackedEntity) -> Option<&Self>;
    fn from_tracked_mut(tracked: &mut TrackedEntity) -> Option<&mut Self>;
}

/// Any entity the tracker can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedEntity {
    House(House),
    Post(Post),
    HousePost(HousePost),
    WeekInfo(HouseWeekInfo),
    WeekMark(WeekMark),
}

impl TrackedEntity {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::House(_) => EntityKind::House,
            Self::Post(_) => EntityKind::Post,
            Self::HousePost(_) => EntityKind::HousePost,
            Self::WeekInfo(_) => EntityKind::WeekInfo,
            Self::WeekMark(_) => EntityKind::WeekMark,
        }
    }

    #[must_use]
    pub fn meta(&self) -> &'static EntityMeta {
        self.kind().meta()
    }

    #[must_use]
    pub fn key(&self) -> Option<FieldValue> {
        match self {
            Self::House(e) => e.key(),
            Self::Post(e) => e.key(),
            Self::HousePost(e) => e.key(),
            Self::WeekInfo(e) => e.key(),
            Self::WeekMark(e) => e.key(),
        }
    }

    #[must_use]
    pub fn values(&self) -> Vec<FieldValue> {
        match self {
            Self::House(e) => e.values(),
            Self::Post(e) => e.values(),
            Self::HousePost(e) => e.values(),
            Self::WeekInfo(e) => e.values(),
            Self::WeekMark(e) => e.values(),
        }
    }

    pub fn assign_generated_key(&mut self, key: Option<i64>) {
        match self {
            Self::House(e) => e.assign_generated_key(key),
            Self::Post(e) => e.assign_generated_key(key),
            Self::HousePost(e) => e.assign_generated_key(key),
            Self::WeekInfo(e) => e.assign_generated_key(key),
            Self::WeekMark(e) => e.assign_generated_key(key),
        }
    }
}
