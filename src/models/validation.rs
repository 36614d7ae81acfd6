use chrono::NaiveDate;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("cycle length must be a positive number of days, got {0}")]
    NonPositiveCycleLength(i64),
    #[error("period end {end} is before its start {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("mood must be between 1 and 5, got {0}")]
    MoodOutOfRange(u8),
    #[error("unknown timeline category '{0}' (use symptom, medication, appointment, measurement or note)")]
    UnknownCategory(String),
    #[error("{0} must not be empty")]
    EmptyText(&'static str),
    #[error("'{0}' is not a date, expected YYYY-MM-DD")]
    BadDate(String),
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| ValidationError::BadDate(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Reject blank user text, returning it trimmed.
pub fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyText(field))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            parse_date(" 2024-01-01 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(
            parse_date("2023-02-29"),
            Err(ValidationError::BadDate("2023-02-29".to_string()))
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(non_empty("title", "  "), Err(ValidationError::EmptyText("title")));
        assert_eq!(non_empty("title", " Headache "), Ok("Headache"));
    }
}
