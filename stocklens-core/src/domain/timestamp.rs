//! Timestamp parsing and formatting for price tables.
//!
//! Raw files carry daily dates (`2024-01-02`) but intraday exports with a time
//! component are accepted too. Output keeps the short date form whenever the
//! time of day is midnight.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a raw timestamp cell. Returns `None` for anything unrecognised.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.naive_utc())
}

/// Format a timestamp for persisted tables and API responses.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Serde adapter: timestamps travel as strings in CSV and JSON.
pub mod serde_timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_date() {
        let ts = parse_timestamp("2024-03-15").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(ts.time(), NaiveTime::MIN);
    }

    #[test]
    fn parses_datetime_variants() {
        assert!(parse_timestamp("2024-03-15 09:30:00").is_some());
        assert!(parse_timestamp("2024-03-15T09:30:00").is_some());
        assert!(parse_timestamp("2024-03-15T09:30:00Z").is_some());
        assert!(parse_timestamp(" 2024-03-15 ").is_some());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn midnight_formats_as_date() {
        let ts = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02");

        let ts = parse_timestamp("2024-01-02 15:45:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02 15:45:00");
    }
}
