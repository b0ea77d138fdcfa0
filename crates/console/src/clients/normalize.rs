//! Response classification and envelope normalization.
//!
//! The backend wraps listings in several shapes (`[..]`, `{data: [..]}`,
//! `{data: {users: [..]}}`, `{users: [..]}`) and reports failures through
//! status codes and free-text messages. Everything here is pure so that it
//! can be tested without a server.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use common::{AppError, AppResult};
use domain::{DomainResult, UserRecord};

/// Known listing envelopes, detected by structural inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `[..]`
    Array(Vec<Value>),
    /// `{data: [..]}`
    DataArray(Vec<Value>),
    /// `{data: {users: [..]}}`
    DataUsers(Vec<Value>),
    /// `{users: [..]}`
    Users(Vec<Value>),
    /// Anything else; yields no records
    Unrecognized,
}

impl Envelope {
    pub fn detect(value: Value) -> Self {
        match value {
            Value::Array(items) => Envelope::Array(items),
            Value::Object(mut map) => {
                match map.remove("data") {
                    Some(Value::Array(items)) => return Envelope::DataArray(items),
                    Some(Value::Object(mut data)) => {
                        if let Some(Value::Array(items)) = data.remove("users") {
                            return Envelope::DataUsers(items);
                        }
                    }
                    _ => {}
                }
                match map.remove("users") {
                    Some(Value::Array(items)) => Envelope::Users(items),
                    _ => Envelope::Unrecognized,
                }
            }
            _ => Envelope::Unrecognized,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Array(_) => "array",
            Envelope::DataArray(_) => "data-array",
            Envelope::DataUsers(_) => "data-users",
            Envelope::Users(_) => "users",
            Envelope::Unrecognized => "unrecognized",
        }
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            Envelope::Array(items)
            | Envelope::DataArray(items)
            | Envelope::DataUsers(items)
            | Envelope::Users(items) => items,
            Envelope::Unrecognized => Vec::new(),
        }
    }
}

/// Flat list of records from any known envelope.
pub fn extract_records(body: Value) -> Vec<Value> {
    let envelope = Envelope::detect(body);
    if envelope == Envelope::Unrecognized {
        warn!("Response did not match any known listing envelope");
    }
    envelope.into_records()
}

/// Single entity from `{data: {..}}` or a bare object.
pub fn extract_object(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Object(_)) => data,
            Some(other) => {
                map.insert("data".to_string(), other);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Interpret each record, skipping (and logging) the ones that are malformed.
pub fn parse_records<T>(
    records: Vec<Value>,
    what: &str,
    parse: impl Fn(Value) -> DomainResult<T>,
) -> Vec<T> {
    let total = records.len();
    let parsed: Vec<T> = records
        .into_iter()
        .filter_map(|record| match parse(record) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed {}: {}", what, e);
                None
            }
        })
        .collect();
    if parsed.len() < total {
        warn!(skipped = total - parsed.len(), "Some {} records were unreadable", what);
    }
    parsed
}

pub fn parse_users(records: Vec<Value>) -> Vec<UserRecord> {
    parse_records(records, "user", UserRecord::from_value)
}

/// Classify a raw HTTP exchange.
///
/// 2xx with a JSON body yields the parsed body unchanged; everything else
/// becomes the matching `AppError`.
pub fn classify(
    status: u16,
    content_type: Option<&str>,
    body: &str,
    retry_after: Option<Duration>,
) -> AppResult<Value> {
    if (200..300).contains(&status) {
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(false);
        if !is_json {
            return Err(AppError::invalid_response(format!(
                "expected JSON, got '{}'",
                content_type.unwrap_or("no content type")
            )));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(body).map_err(AppError::from);
    }

    let message = failure_message(status, body);
    let lowered = message.to_ascii_lowercase();

    match status {
        401 => Err(AppError::SessionExpired),
        403 => Err(AppError::Forbidden(message)),
        429 => Err(AppError::RateLimited { retry_after }),
        _ if lowered.contains("permission") || lowered.contains("access denied") => {
            Err(AppError::Forbidden(message))
        }
        404 => Err(AppError::NotFound(message)),
        _ if lowered.contains("not found") => Err(AppError::NotFound(message)),
        _ => Err(AppError::api(status, message)),
    }
}

/// `message`/`error` from a JSON body, else the raw text, else a default.
fn failure_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error", "msg"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(s)) = inner.get("message") {
                        return s.clone();
                    }
                }
                _ => {}
            }
        }
    }
    if trimmed.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        trimmed.to_string()
    }
}

/// `Retry-After` in delta-seconds form.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const JSON: Option<&str> = Some("application/json; charset=utf-8");

    fn records() -> Value {
        json!([{"_id": "A", "role": "seller"}, {"_id": "B", "role": "coach"}])
    }

    #[test]
    fn test_every_envelope_yields_the_same_records() {
        let shapes = [
            records(),
            json!({"success": true, "data": records()}),
            json!({"data": {"users": records(), "total": 2}}),
            json!({"users": records()}),
        ];

        for shape in shapes {
            assert_eq!(extract_records(shape), records().as_array().unwrap().clone());
        }
    }

    #[test]
    fn test_envelope_detection_order() {
        assert_eq!(Envelope::detect(json!({"data": []})).kind(), "data-array");
        assert_eq!(Envelope::detect(json!({"data": {"users": []}})).kind(), "data-users");
        assert_eq!(
            Envelope::detect(json!({"data": {"total": 0}, "users": [{"_id": "x"}]})).kind(),
            "users"
        );
        assert_eq!(Envelope::detect(json!({"message": "ok"})).kind(), "unrecognized");
        assert!(extract_records(json!("text")).is_empty());
    }

    #[test]
    fn test_extract_object() {
        assert_eq!(extract_object(json!({"data": {"_id": "A"}})), json!({"_id": "A"}));
        assert_eq!(extract_object(json!({"_id": "A"})), json!({"_id": "A"}));
    }

    #[test]
    fn test_classify_success() {
        let value = classify(200, JSON, r#"{"users": []}"#, None).unwrap();
        assert_eq!(value, json!({"users": []}));
    }

    #[test]
    fn test_classify_non_json_success_is_invalid() {
        let err = classify(200, Some("text/html"), "<html>", None).unwrap_err();
        assert!(matches!(err, AppError::InvalidResponse(_)));
    }

    #[test]
    fn test_classify_failures() {
        assert!(matches!(
            classify(401, JSON, "{}", None),
            Err(AppError::SessionExpired)
        ));
        assert!(matches!(
            classify(403, JSON, r#"{"message": "Admins only"}"#, None),
            Err(AppError::Forbidden(ref m)) if m == "Admins only"
        ));
        assert!(matches!(
            classify(500, JSON, r#"{"error": "You do not have permission"}"#, None),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            classify(429, None, "", Some(Duration::from_secs(3))),
            Err(AppError::RateLimited { retry_after: Some(d) }) if d == Duration::from_secs(3)
        ));
        assert!(matches!(
            classify(400, JSON, r#"{"message": "Store not found"}"#, None),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(classify(404, None, "", None), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_generic_failure_keeps_server_message() {
        let err = classify(422, JSON, r#"{"message": "Status is invalid"}"#, None).unwrap_err();
        assert_eq!(err.user_message(), "Status is invalid");

        let err = classify(502, Some("text/plain"), "Bad gateway", None).unwrap_err();
        assert_eq!(err.user_message(), "Bad gateway");
    }

    #[test]
    fn test_parse_users_skips_malformed() {
        let users = parse_users(vec![json!({"_id": "A"}), json!({"name": "no id"}), json!(3)]);
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_retry_after() {
        assert_eq!(parse_retry_after(Some("5")), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")), None);
        assert_eq!(parse_retry_after(None), None);
    }
}
