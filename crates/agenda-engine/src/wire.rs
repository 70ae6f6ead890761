//! Lenient decoding of backend wire values.
//!
//! The backend emits naive ISO 8601 datetimes (no offset) for stored values while
//! browser clients send RFC 3339 with `Z`. Both are accepted; naive values are read
//! as UTC. Decimal prices may arrive as JSON numbers or strings.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

use crate::error::{EngineError, Result};

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (e.g. "2026-02-17T14:00:00+00:00") and naive
/// "2026-02-17T14:00:00" / "2026-02-17T14:00:00.123456" (read as UTC).
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|_| EngineError::InvalidDateTime(s.to_string()))
}

/// Serde adapter for `DateTime<Utc>` fields.
pub mod datetime {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse_datetime(&raw).map_err(de::Error::custom)
    }
}

/// Parse a time of day written as `HH:MM` or `HH:MM:SS`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Serde adapter for time-of-day fields.
pub mod time {
    use super::*;

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time(&raw).ok_or_else(|| de::Error::custom(format!("invalid time '{}'", raw)))
    }
}

/// Serde adapter for prices sent either as numbers or decimal strings.
pub mod price {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(0.0),
            Some(Raw::Number(n)) => Ok(n),
            Some(Raw::Text(t)) => t
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid price '{}'", t))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn naive_datetime_is_read_as_utc() {
        let expected = Utc.with_ymd_and_hms(2026, 2, 17, 14, 0, 0).unwrap();
        assert_eq!(parse_datetime("2026-02-17T14:00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2026-02-17T14:00:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2026-02-17T11:00:00-03:00").unwrap(), expected);
    }

    #[test]
    fn time_accepts_minutes_and_seconds() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(parse_time("09:00"), Some(nine));
        assert_eq!(parse_time("09:00:00"), Some(nine));
        assert_eq!(parse_time("9h"), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            parse_datetime("tomorrow"),
            Err(EngineError::InvalidDateTime("tomorrow".to_string()))
        );
    }
}
