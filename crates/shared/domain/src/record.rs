//! Helpers for loosely-shaped backend JSON records.
//!
//! The backend is not consistent about identifier fields (`_id` vs `id`,
//! strings vs numbers vs `{"$oid": ..}`) or scalar types, so every typed
//! record in this crate is built through these helpers.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Normalize any identifier shape into its string form.
///
/// Accepts plain strings, numbers, and nested objects carrying `$oid`,
/// `_id` or `id` (a populated reference).
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("$oid")
            .or_else(|| map.get("_id"))
            .or_else(|| map.get("id"))
            .and_then(normalize_id),
        _ => None,
    }
}

/// Read the identity of a record, treating `_id` and `id` interchangeably.
pub fn record_id(map: &Map<String, Value>) -> Option<String> {
    map.get("_id")
        .and_then(normalize_id)
        .or_else(|| map.get("id").and_then(normalize_id))
}

/// Whether a JSON value carries no information.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Copy entries from `other` into `target` where `target` has nothing.
///
/// Existing non-blank values are never overwritten, and blank values from
/// `other` are never copied.
pub fn fill_blanks(target: &mut Map<String, Value>, other: Map<String, Value>) {
    for (key, value) in other {
        if is_blank(&value) {
            continue;
        }
        match target.get(&key) {
            Some(existing) if !is_blank(existing) => {}
            _ => {
                target.insert(key, value);
            }
        }
    }
}

/// Copy every non-blank entry from `other` over `target`.
pub fn overlay_non_blank(target: &mut Map<String, Value>, other: Map<String, Value>) {
    for (key, value) in other {
        if !is_blank(&value) {
            target.insert(key, value);
        }
    }
}

/// Replace `slot` with `candidate` when `slot` is empty.
pub(crate) fn fill_string(slot: &mut Option<String>, candidate: Option<String>) {
    let empty = slot.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true);
    if empty {
        if let Some(value) = candidate.filter(|v| !v.trim().is_empty()) {
            *slot = Some(value);
        }
    }
}

/// Replace `slot` with `candidate` when `candidate` is non-empty.
pub(crate) fn prefer_string(slot: &mut Option<String>, candidate: Option<String>) {
    if let Some(value) = candidate.filter(|v| !v.trim().is_empty()) {
        *slot = Some(value);
    }
}

/// Take the first present key out of a map.
pub(crate) fn take_first(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = map.remove(*key) {
            if found.is_none() && !value.is_null() {
                found = Some(value);
            }
        }
    }
    found
}

/// Move the first non-null alias under `canonical` when it is absent.
///
/// Backends disagree on field names (`phone`/`mobile`, `title`/`subject`);
/// serde aliases reject records carrying both, so aliases are folded here.
pub(crate) fn promote_alias(map: &mut Map<String, Value>, canonical: &str, aliases: &[&str]) {
    if map.get(canonical).map(|v| !v.is_null()).unwrap_or(false) {
        return;
    }
    for alias in aliases {
        if map.get(*alias).map(|v| !v.is_null()).unwrap_or(false) {
            if let Some(value) = map.remove(*alias) {
                map.insert(canonical.to_string(), value);
            }
            return;
        }
    }
}

/// Render a scalar JSON value as a string.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a timestamp from an RFC 3339 string or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => map.get("$date").and_then(parse_timestamp),
        _ => None,
    }
}

/// Lenient field deserializers for serde `deserialize_with`.
pub mod lenient {
    use super::*;

    /// Strings, numbers and booleans become a string; anything else is `None`.
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(scalar_string))
    }

    /// Numbers or numeric strings become `f64`.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Booleans or "true"/"false" strings; missing is `false`.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    /// Timestamps that fail to parse are dropped instead of failing the record.
    pub fn datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_timestamp))
    }
}
