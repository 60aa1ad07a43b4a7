//! Validated value objects.
//!
//! Constructors trim and check their input and return
//! `CoreError::Validation` with a user-facing message on failure. Entities
//! only accept these types in their mutators, so stored data always passed
//! validation once.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const MAX_WEEK_MARK_COMMENT_LENGTH: usize = 2000;
pub const MAX_BRIGADE_NAME_LENGTH: usize = 50;
pub const MAX_POST_NAME_LENGTH: usize = 100;

/// Earliest accepted week start date (2021-01-01).
#[must_use]
pub fn min_week_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Name of the brigade building a house.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Brigade(String);

impl Brigade {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the trimmed name is empty or longer
    /// than [`MAX_BRIGADE_NAME_LENGTH`].
    pub fn new(name: &str) -> Result<Self, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Brigade name must not be empty".into()));
        }
        if trimmed.chars().count() > MAX_BRIGADE_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Brigade name must be shorter than {MAX_BRIGADE_NAME_LENGTH} symbols"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Footprint of a house in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HouseMetrics {
    pub length: f64,
    pub width: f64,
}

impl HouseMetrics {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` unless both dimensions are positive.
    pub fn new(length: f64, width: f64) -> Result<Self, CoreError> {
        if length <= 0.0 {
            return Err(CoreError::Validation("Length must be bigger than 0".into()));
        }
        if width <= 0.0 {
            return Err(CoreError::Validation("Width must be bigger than 0".into()));
        }
        Ok(Self { length, width })
    }
}

/// Top-left corner of a house on the site plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A start date with an optional end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateSpan {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `end` is before `start`.
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, CoreError> {
        if end.is_some_and(|end| start > end) {
            return Err(CoreError::Validation(
                "The start date must be earlier than the end date".into(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the span; an open end is unbounded.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date <= end)
    }
}

/// Name of a structural post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PostName(String);

impl PostName {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the trimmed name is longer than
    /// [`MAX_POST_NAME_LENGTH`].
    pub fn new(name: &str) -> Result<Self, CoreError> {
        let trimmed = name.trim();
        if trimmed.chars().count() > MAX_POST_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Post name must be shorter than {MAX_POST_NAME_LENGTH} symbols"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Free-text comment attached to a week mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct MarkComment(String);

impl MarkComment {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the trimmed comment is empty or
    /// longer than [`MAX_WEEK_MARK_COMMENT_LENGTH`].
    pub fn new(comment: &str) -> Result<Self, CoreError> {
        let trimmed = comment.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Comment must not be empty".into()));
        }
        if trimmed.chars().count() > MAX_WEEK_MARK_COMMENT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Comment must be shorter than {MAX_WEEK_MARK_COMMENT_LENGTH} symbols"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// First day of a tracked construction week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct WeekStartDate(NaiveDate);

impl WeekStartDate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for dates before [`min_week_date`].
    pub fn new(date: NaiveDate) -> Result<Self, CoreError> {
        let min = min_week_date();
        if date < min {
            return Err(CoreError::Validation(format!(
                "Week start date must be greater than {min}"
            )));
        }
        Ok(Self(date))
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("Alpha", "Alpha")]
    #[case("  Beta  ", "Beta")]
    fn brigade_trims(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Brigade::new(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("    ")]
    fn brigade_rejects_blank(#[case] input: &str) {
        assert!(matches!(Brigade::new(input), Err(CoreError::Validation(_))));
    }

    #[test]
    fn brigade_rejects_overlong_name() {
        let name = "x".repeat(MAX_BRIGADE_NAME_LENGTH + 1);
        assert!(Brigade::new(&name).is_err());
        assert!(Brigade::new(&"x".repeat(MAX_BRIGADE_NAME_LENGTH)).is_ok());
    }

    #[rstest]
    #[case(0.0, 5.0)]
    #[case(5.0, 0.0)]
    #[case(-1.0, 5.0)]
    fn metrics_require_positive_dimensions(#[case] length: f64, #[case] width: f64) {
        assert!(HouseMetrics::new(length, width).is_err());
    }

    #[test]
    fn date_span_rejects_inverted_range() {
        assert!(DateSpan::new(date(2024, 5, 1), Some(date(2024, 4, 1))).is_err());
        assert!(DateSpan::new(date(2024, 5, 1), Some(date(2024, 5, 1))).is_ok());
        assert!(DateSpan::new(date(2024, 5, 1), None).is_ok());
    }

    #[test]
    fn date_span_contains_respects_open_end() {
        let closed = DateSpan::new(date(2024, 1, 1), Some(date(2024, 12, 31))).unwrap();
        assert!(closed.contains(date(2024, 6, 1)));
        assert!(!closed.contains(date(2025, 1, 1)));

        let open = DateSpan::new(date(2024, 1, 1), None).unwrap();
        assert!(open.contains(date(2099, 1, 1)));
        assert!(!open.contains(date(2023, 12, 31)));
    }

    #[test]
    fn post_name_allows_empty_but_not_overlong() {
        assert_eq!(PostName::new("  Main ").unwrap().as_str(), "Main");
        assert!(PostName::new(&"p".repeat(MAX_POST_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn mark_comment_validation() {
        assert!(MarkComment::new("   ").is_err());
        assert!(MarkComment::new(&"c".repeat(MAX_WEEK_MARK_COMMENT_LENGTH + 1)).is_err());
        assert_eq!(
            MarkComment::new(" cracks in foundation ").unwrap().as_str(),
            "cracks in foundation"
        );
    }

    #[test]
    fn week_start_date_has_lower_bound() {
        assert!(WeekStartDate::new(date(2020, 12, 31)).is_err());
        assert_eq!(
            WeekStartDate::new(date(2021, 1, 1)).unwrap().date(),
            date(2021, 1, 1)
        );
    }
}
