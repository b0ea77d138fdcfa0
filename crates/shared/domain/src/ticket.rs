//! Support tickets raised by platform users.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::record::{
    lenient, normalize_id, promote_alias, record_id, scalar_string, take_first,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Unknown(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for TicketStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "open" => TicketStatus::Open,
            "in_progress" | "inprogress" => TicketStatus::InProgress,
            "resolved" => TicketStatus::Resolved,
            "closed" => TicketStatus::Closed,
            _ => TicketStatus::Unknown(s.trim().to_string()),
        }
    }
}

impl From<String> for TicketStatus {
    fn from(s: String) -> Self {
        TicketStatus::from(s.as_str())
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        status.as_str().to_string()
    }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match TicketStatus::from(s) {
            TicketStatus::Unknown(raw) => Err(DomainError::validation(format!(
                "Invalid ticket status '{}'. Must be one of: open, in_progress, resolved, closed",
                raw
            ))),
            status => Ok(status),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
    Unknown(String),
}

impl TicketPriority {
    pub fn as_str(&self) -> &str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
            TicketPriority::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for TicketPriority {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => TicketPriority::Low,
            "medium" | "normal" => TicketPriority::Medium,
            "high" => TicketPriority::High,
            "urgent" | "critical" => TicketPriority::Urgent,
            _ => TicketPriority::Unknown(s.trim().to_string()),
        }
    }
}

impl From<String> for TicketPriority {
    fn from(s: String) -> Self {
        TicketPriority::from(s.as_str())
    }
}

impl From<TicketPriority> for String {
    fn from(priority: TicketPriority) -> Self {
        priority.as_str().to_string()
    }
}

impl FromStr for TicketPriority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match TicketPriority::from(s) {
            TicketPriority::Unknown(raw) => Err(DomainError::validation(format!(
                "Invalid priority '{}'. Must be one of: low, medium, high, urgent",
                raw
            ))),
            priority => Ok(priority),
        }
    }
}

impl std::fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One message in a ticket thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketReply {
    #[serde(default, deserialize_with = "lenient::string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TicketReply {
    fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };
        if let Some(sender) = take_first(&mut map, &["from", "sender", "author", "by"]) {
            let label = requester_label(&sender).map(Value::String);
            map.insert("from".to_string(), label.unwrap_or(Value::Null));
        }
        promote_alias(&mut map, "createdAt", &["timestamp"]);
        serde_json::from_value(Value::Object(map)).ok()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicket {
    #[serde(default, deserialize_with = "lenient::string")]
    subject: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    message: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    priority: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A support ticket as listed by the admin support endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    #[serde(rename = "_id")]
    pub id: String,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: Option<String>,
    /// Requester id, name or email, whichever the backend provided.
    pub requester: Option<String>,
    pub replies: Vec<TicketReply>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SupportTicket {
    pub fn from_value(value: Value) -> DomainResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(DomainError::malformed("ticket is not an object"));
        };

        let id = record_id(&map).ok_or_else(|| DomainError::malformed("ticket has no id"))?;
        map.remove("_id");
        map.remove("id");

        let requester = take_first(&mut map, &["user", "userId", "requester", "createdBy"])
            .and_then(|value| requester_label(&value));
        let replies = take_first(&mut map, &["replies", "responses", "messages"])
            .map(|value| match value {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(TicketReply::from_value)
                    .collect(),
                _ => Vec::new(),
            })
            .unwrap_or_default();

        promote_alias(&mut map, "subject", &["title"]);
        promote_alias(&mut map, "message", &["description"]);

        let raw: RawTicket = serde_json::from_value(Value::Object(map))
            .map_err(|e| DomainError::malformed(e.to_string()))?;

        Ok(Self {
            id,
            subject: raw.subject,
            message: raw.message,
            status: raw
                .status
                .map(TicketStatus::from)
                .unwrap_or(TicketStatus::Open),
            priority: raw
                .priority
                .map(TicketPriority::from)
                .unwrap_or(TicketPriority::Medium),
            category: raw.category,
            requester,
            replies,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            extra: raw.extra,
        })
    }
}

fn requester_label(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .get("name")
            .and_then(scalar_string)
            .or_else(|| map.get("email").and_then(scalar_string))
            .or_else(|| normalize_id(value)),
        other => normalize_id(other),
    }
}

/// Body of `PUT /api/admin/support/tickets/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketUpdate {
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TicketPriority>,
}
