use chrono::NaiveDate;
use serde::de::DeserializeOwned;

/// Parse a `snake_case` enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str, field: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

pub fn parse_opt_date(raw: Option<&str>, field: &str) -> anyhow::Result<Option<NaiveDate>> {
    raw.map(|value| parse_date(value, field)).transpose()
}

#[cfg(test)]
mod tests {
    use mh_core::enums::{HouseStatus, MarkType};

    use super::*;

    #[test]
    fn parses_snake_case_enum() {
        let state: HouseStatus = parse_enum("in_process", "state").expect("state should parse");
        assert_eq!(state, HouseStatus::InProcess);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let mark: MarkType = parse_enum("red-mark", "type").expect("type should parse");
        assert_eq!(mark, MarkType::RedMark);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<HouseStatus>("done", "state").expect_err("should fail");
        assert!(err.to_string().contains("invalid state 'done'"));
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2024-03-01", "start").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2024", "start").is_err());
        assert_eq!(parse_opt_date(None, "end").unwrap(), None);
    }
}
