//! Local calendar dates.
//!
//! Deadlines and invoice dates are plain calendar dates (`YYYY-MM-DD`). They are
//! read component by component into a [`NaiveDate`] so that a date never shifts
//! by a day through an implicit UTC interpretation.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{DomainError, DomainResult};

/// Parse a `YYYY-MM-DD` calendar date as a local date.
///
/// A trailing time component (`2025-03-01T00:00:00Z`) is ignored; only the
/// calendar part is significant.
pub fn parse_calendar_date(input: &str) -> DomainResult<NaiveDate> {
    let trimmed = input.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);

    let mut parts = date_part.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(DomainError::invalid_date(format!(
            "expected YYYY-MM-DD, got {input:?}"
        )));
    };

    let year: i32 = parse_component(year, "year", input)?;
    let month: u32 = parse_component(month, "month", input)?;
    let day: u32 = parse_component(day, "day", input)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DomainError::invalid_date(format!("{input:?} is not a calendar date")))
}

fn parse_component<T: core::str::FromStr>(raw: &str, what: &str, input: &str) -> DomainResult<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DomainError::invalid_date(format!(
            "{what} component of {input:?} is not numeric"
        )));
    }
    raw.parse()
        .map_err(|_| DomainError::invalid_date(format!("{what} component of {input:?} is out of range")))
}

/// Last representable instant of `date` at millisecond precision
/// (23:59:59.999 local time).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

/// Serde adapter for calendar dates stored as `YYYY-MM-DD` strings.
///
/// Use with `#[serde(with = "clubreg_core::date::calendar_date")]`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}
