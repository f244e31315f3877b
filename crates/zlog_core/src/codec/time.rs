//! Serde adapters for sleep timestamps and time zones.
//!
//! Writers always emit the current shape; readers also accept the legacy
//! shapes produced by earlier app versions:
//! - `date`: RFC 3339 string, or seconds since 2001-01-01T00:00:00Z.
//! - `timeZone`: `{"identifier": "<IANA name>"}`, or a bare IANA name.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// 2001-01-01T00:00:00Z as a unix timestamp.
const REFERENCE_DATE_UNIX_SECS: f64 = 978_307_200.0;

/// Converts reference-date seconds (2001-01-01 epoch) into a UTC instant.
pub fn from_reference_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let unix = seconds + REFERENCE_DATE_UNIX_SECS;
    let whole = unix.floor();
    let nanos = ((unix - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
}

pub mod sleep_date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(text) => DateTime::parse_from_rfc3339(&text)
                .map(|date| date.with_timezone(&Utc))
                .map_err(|err| D::Error::custom(format!("invalid sleep date `{text}`: {err}"))),
            Value::Number(number) => number
                .as_f64()
                .and_then(from_reference_seconds)
                .ok_or_else(|| D::Error::custom(format!("sleep date `{number}` is out of range"))),
            other => Err(D::Error::custom(format!(
                "sleep date must be a string or a number, got `{other}`"
            ))),
        }
    }
}

pub mod time_zone {
    use super::*;

    pub fn serialize<S: Serializer>(zone: &Tz, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("identifier", zone.name())?;
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tz, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let name = match &value {
            Value::String(name) => name.as_str(),
            Value::Object(fields) => fields
                .get("identifier")
                .and_then(Value::as_str)
                .ok_or_else(|| D::Error::custom("time zone object is missing `identifier`"))?,
            other => {
                return Err(D::Error::custom(format!(
                    "time zone must be a string or an object, got `{other}`"
                )))
            }
        };
        name.parse::<Tz>()
            .map_err(|err| D::Error::custom(format!("unknown time zone `{name}`: {err}")))
    }
}
