use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field names that may carry a record timestamp, in priority order
pub const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "ts", "created_at"];

/// Interprets a JSON value as a timestamp
///
/// Numbers are Unix epoch milliseconds. Strings are RFC 3339, or ISO-8601 without an
/// offset (read as UTC). Anything else, including out-of-range values, yields `None`.
pub fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

/// Offset-less layouts accepted after RFC 3339
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

/// First parseable timestamp among [`TIMESTAMP_FIELDS`] on a record
pub fn record_timestamp(record: &Value) -> Option<DateTime<Utc>> {
    TIMESTAMP_FIELDS.iter().filter_map(|field| record.get(*field)).find_map(timestamp_from_value)
}

/// Custom deserializer for timestamp that accepts both integers (ms) and RFC3339 strings
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(_) | Value::String(_) => timestamp_from_value(&value)
            .ok_or_else(|| Error::custom(format!("invalid timestamp: {}", value))),
        _ => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Optional variant of [`deserialize_timestamp`]; `null` and unparseable values become `None`
pub fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_from_value))
}
