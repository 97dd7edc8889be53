//! Typed records fetched from the external record store.

pub mod payment;
pub mod session;
pub mod user;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Raw object envelope as returned by the record store.
///
/// `metadata` carries the collection-specific attribute bag; unknown wire
/// fields (`slug`, `title`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject<M> {
    pub id: String,
    pub metadata: M,
    pub created_at: DateTime<Utc>,
}

/// Parse an ISO-8601 date-or-datetime string into a UTC instant.
///
/// Accepts RFC 3339, a naive datetime, or a bare calendar date (taken as
/// midnight UTC). Returns `None` for anything else.
pub fn parse_record_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Resolve a record's event timestamp from its metadata date field.
///
/// An absent field falls back to the object's `created_at`; a present but
/// malformed value resolves to `None` so the record matches no bucket.
pub fn resolve_event_date(
    field: Option<&str>,
    created_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match field {
        Some(raw) => parse_record_date(raw),
        None => Some(created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn parses_rfc3339_datetime() {
        let parsed = parse_record_date("2024-03-05T14:30:00Z").unwrap();
        assert_eq!(parsed.date_naive().to_string(), "2024-03-05");
        assert_eq!(parsed.hour(), 14);
    }

    #[test]
    fn parses_offset_datetime_into_utc() {
        let parsed = parse_record_date("2024-03-05T23:30:00-05:00").unwrap();
        // 23:30 EST is 04:30 UTC on the next calendar day.
        assert_eq!(parsed.date_naive().to_string(), "2024-03-06");
        assert_eq!(parsed.hour(), 4);
    }

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let parsed = parse_record_date("2024-03-05").unwrap();
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.date_naive().to_string(), "2024-03-05");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_record_date("not-a-date").is_none());
        assert!(parse_record_date("2024-13-40").is_none());
        assert!(parse_record_date("").is_none());
    }

    #[test]
    fn absent_field_falls_back_to_created_at() {
        let created = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(resolve_event_date(None, created), Some(created));
    }

    #[test]
    fn malformed_field_does_not_fall_back() {
        let created = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        assert_eq!(resolve_event_date(Some("garbage"), created), None);
    }
}
