//! Lenient field decoders for backend JSON.
//!
//! The monitoring backend is loose about types: counts arrive as numbers or
//! numeric strings, timestamps with or without a zone, and any field may be
//! `null`. These decoders never fail on a bad value; they substitute zero or
//! absence so a report degrades to zero-valued rows instead of erroring.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses the leading numeric prefix of a string, like a browser `parseFloat`.
///
/// `"73.5%"` yields `73.5`, `"  12abc"` yields `12.0`, `"abc"` yields `None`.
/// Non-finite results are rejected.
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let prefix_len = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .count();
    let prefix = &trimmed[..prefix_len];

    (1..=prefix.len())
        .rev()
        .find_map(|end| prefix[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Extracts a finite number from a JSON value, accepting numeric strings.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Extracts a non-negative count from a JSON value.
fn count_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_float(s).map(|f| f.trunc() as i64),
        _ => None,
    }
    .map(|n| n.max(0))
}

/// Parses a backend timestamp.
///
/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` / `YYYY-MM-DD HH:MM:SS[.f]`
/// which is taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|naive| naive.and_utc())
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Count field: missing, `null` or unusable values become 0.
pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value).unwrap_or(0))
}

/// Optional count field: missing, `null` or unusable values become `None`.
pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

/// Text field that may arrive as a string or a number.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Timestamp field; unparseable values become `None`.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_from_value))
}

/// Calendar date field; accepts `YYYY-MM-DD` or a full timestamp.
pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .or_else(|| parse_timestamp(&s).map(|ts| ts.date_naive())),
        _ => None,
    })
}

/// Boolean flag that tolerates `null`.
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_bool))
}

/// App-name to seconds mapping; non-object input becomes an empty map and
/// negative or non-numeric durations count as zero.
pub fn usage_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(map)) = value else {
        return Ok(BTreeMap::new());
    };

    Ok(map
        .into_iter()
        .map(|(app, secs)| {
            let secs = number_from_value(&secs).unwrap_or(0.0).max(0.0);
            (app, secs)
        })
        .collect())
}

/// List field where `null` means empty. Elements must still decode.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
