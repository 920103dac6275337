//! Start-time normalization for match documents.
//!
//! Matches are written by more than one tool, so the `timestamp` field shows up as:
//! - a native store timestamp object (`{seconds, nanoseconds}`)
//! - the REST encoding of the same object (`{_seconds, _nanoseconds}`)
//! - epoch milliseconds as a JSON number
//! - a string (RFC 3339, naive date-time, date-only, or epoch milliseconds)
//!
//! Everything is converted to `DateTime<Utc>` before any comparison happens.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp is missing")]
    Missing,

    #[error("timestamp out of range: {0}")]
    OutOfRange(String),

    #[error("unparseable timestamp string: {0:?}")]
    Unparseable(String),

    #[error("unsupported timestamp value: {0}")]
    Unsupported(String),
}

/// A timestamp exactly as stored.
///
/// Variant order matters: serde tries them top to bottom, and `Other`
/// swallows anything else so one bad document never fails a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Native {
        seconds: i64,
        #[serde(default)]
        nanoseconds: u32,
    },
    Rest {
        #[serde(rename = "_seconds")]
        seconds: i64,
        #[serde(rename = "_nanoseconds", default)]
        nanoseconds: u32,
    },
    Millis(i64),
    Text(String),
    Other(serde_json::Value),
}

impl Default for RawTimestamp {
    fn default() -> Self {
        RawTimestamp::Other(serde_json::Value::Null)
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        RawTimestamp::Native {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }
}

impl RawTimestamp {
    /// Convert to the canonical in-memory representation.
    pub fn normalize(&self) -> Result<DateTime<Utc>, TimestampError> {
        match self {
            RawTimestamp::Native {
                seconds,
                nanoseconds,
            }
            | RawTimestamp::Rest {
                seconds,
                nanoseconds,
            } => from_seconds(*seconds, *nanoseconds),
            RawTimestamp::Millis(ms) => from_millis(*ms),
            RawTimestamp::Text(s) => parse_text(s),
            RawTimestamp::Other(value) => match value {
                serde_json::Value::Null => Err(TimestampError::Missing),
                serde_json::Value::Number(n) => match n.as_f64() {
                    // Fractional milliseconds truncate toward zero
                    Some(ms) if ms.is_finite() => from_millis(ms.trunc() as i64),
                    _ => Err(TimestampError::OutOfRange(n.to_string())),
                },
                other => Err(TimestampError::Unsupported(other.to_string())),
            },
        }
    }
}

fn from_seconds(seconds: i64, nanoseconds: u32) -> Result<DateTime<Utc>, TimestampError> {
    if nanoseconds >= 1_000_000_000 {
        return Err(TimestampError::OutOfRange(format!(
            "{}s {}ns",
            seconds, nanoseconds
        )));
    }
    Utc.timestamp_opt(seconds, nanoseconds)
        .single()
        .ok_or_else(|| TimestampError::OutOfRange(format!("{}s", seconds)))
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, TimestampError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| TimestampError::OutOfRange(format!("{}ms", ms)))
}

fn parse_text(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(TimestampError::Missing);
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        let ms: i64 = s
            .parse()
            .map_err(|_| TimestampError::OutOfRange(s.to_string()))?;
        return from_millis(ms);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Naive forms carry no offset and are read as UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    Err(TimestampError::Unparseable(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawTimestamp {
        serde_json::from_value(value).unwrap()
    }

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_all_representations_agree() {
        let secs = expected().timestamp();
        let ms = expected().timestamp_millis();

        let inputs = vec![
            json!({ "seconds": secs, "nanoseconds": 0 }),
            json!({ "_seconds": secs, "_nanoseconds": 0 }),
            json!(ms),
            json!(ms.to_string()),
            json!("2025-03-14T09:30:00Z"),
            json!("2025-03-14T15:00:00+05:30"),
            json!("2025-03-14T09:30:00"),
            json!("2025-03-14 09:30:00"),
        ];

        for input in inputs {
            assert_eq!(raw(input.clone()).normalize(), Ok(expected()), "input {}", input);
        }
    }

    #[test]
    fn test_variant_selection() {
        assert!(matches!(raw(json!({ "seconds": 1 })), RawTimestamp::Native { .. }));
        assert!(matches!(raw(json!({ "_seconds": 1 })), RawTimestamp::Rest { .. }));
        assert!(matches!(raw(json!(1)), RawTimestamp::Millis(1)));
        assert!(matches!(raw(json!("x")), RawTimestamp::Text(_)));
        assert!(matches!(raw(json!(true)), RawTimestamp::Other(_)));
    }

    #[test]
    fn test_date_only_is_utc_midnight() {
        assert_eq!(
            raw(json!("2025-03-14")).normalize(),
            Ok(Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_fractional_millis_truncate() {
        let ms = expected().timestamp_millis() as f64 + 0.9;
        assert_eq!(raw(json!(ms)).normalize(), Ok(expected()));
    }

    #[test]
    fn test_malformed_values() {
        assert_eq!(RawTimestamp::default().normalize(), Err(TimestampError::Missing));
        assert_eq!(raw(json!("")).normalize(), Err(TimestampError::Missing));
        assert!(matches!(
            raw(json!("next tuesday")).normalize(),
            Err(TimestampError::Unparseable(_))
        ));
        assert!(matches!(
            raw(json!({ "foo": 1 })).normalize(),
            Err(TimestampError::Unsupported(_))
        ));
        assert!(matches!(
            raw(json!(i64::MAX)).normalize(),
            Err(TimestampError::OutOfRange(_))
        ));
        assert!(matches!(
            raw(json!({ "seconds": 0, "nanoseconds": 1_000_000_000u32 })).normalize(),
            Err(TimestampError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_from_datetime_round_trip() {
        let ts = RawTimestamp::from(expected());
        assert_eq!(ts.normalize(), Ok(expected()));
    }
}
