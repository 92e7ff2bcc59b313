// Utility functions
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serializer;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an RFC 3339 string into `DateTime<Utc>`, if possible.
pub fn parse_datetime(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date_str.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Writes a timestamp as `2024-05-01T12:00:00.000Z`.
pub fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Comma-joined `YYYY-MM-DD` list, used in provenance labels.
pub fn join_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect::<Vec<_>>()
        .join(",")
}
