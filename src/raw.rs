//! Defensive access to untyped Hermes payloads.
//!
//! The Hermes API guarantees no schema, so records are kept as raw
//! [`serde_json::Value`]s and every read goes through an accessor that
//! tolerates absence, `null`, and wrong types. Nothing here fails: callers
//! decide whether a missing value is an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::window::epoch_to_utc;

/// Field carrying the record's unique identifier.
pub const ID_FIELD: &str = "_id";
/// Field carrying the record's last modification time.
pub const LAST_UPDATED_FIELD: &str = "last_updated";

/// One untyped thread or space object as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord(Value);

impl RawRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the field value, treating `null` as absent.
    pub fn field(&self, key: &str) -> Option<&Value> {
        field(&self.0, key)
    }

    /// Returns the field as a string slice if it is a JSON string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Renders the field as display text; absent fields render empty.
    pub fn text_field(&self, key: &str) -> String {
        text_field(&self.0, key)
    }

    /// Returns the field as a slice of elements, empty when absent or not an array.
    pub fn array_field(&self, key: &str) -> &[Value] {
        self.field(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the field value for verbatim passthrough, `null` when absent.
    pub fn passthrough(&self, key: &str) -> Value {
        self.field(key).cloned().unwrap_or(Value::Null)
    }

    /// The record's identifier, if present as a non-empty string.
    pub fn id(&self) -> Option<&str> {
        self.str_field(ID_FIELD).filter(|s| !s.trim().is_empty())
    }

    /// The record's last modification time in UTC, `None` when unknown.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.field(LAST_UPDATED_FIELD).and_then(parse_timestamp)
    }
}

impl From<Value> for RawRecord {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Reads `key` from a JSON object, treating `null` and non-objects as absent.
pub fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| !v.is_null())
}

/// Renders `key` of a JSON object as text, empty when absent.
pub fn text_field(value: &Value, key: &str) -> String {
    field(value, key).map(render_scalar).unwrap_or_default()
}

/// Renders a JSON value as human-readable text.
///
/// Strings are emitted without quotes, `null` as the empty string, and
/// everything else in its compact JSON form.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses an upstream timestamp into UTC.
///
/// Accepts RFC 3339, the space-separated ISO form with an offset,
/// naive ISO datetimes and dates (taken as UTC), and
/// epoch seconds (integer or fractional).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => match n.as_i64() {
            Some(secs) => DateTime::from_timestamp(secs, 0),
            None => n.as_f64().and_then(|secs| epoch_to_utc(secs).ok()),
        },
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
