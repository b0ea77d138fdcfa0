//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    ROLE_ADMIN, ROLE_COACH, ROLE_DELIVERY, ROLE_PLAYER, ROLE_SELLER, ROLE_STORE,
    STATUS_ACTIVE, STATUS_INACTIVE, STATUS_PENDING, STATUS_REJECTED, STATUS_SUSPENDED,
};
use crate::documents::Documents;
use crate::error::{DomainError, DomainResult};
use crate::profile::{RolePartition, RoleProfile};
use crate::record::{self, fill_string, lenient, prefer_string, promote_alias, take_first};

/// User roles enumeration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    Player,
    Coach,
    Seller,
    Delivery,
    Admin,
    /// Unrecognized (or missing) role, kept verbatim
    Unknown(String),
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, UserRole::Unknown(_))
    }

    /// The approval partition this role belongs to, if any.
    pub fn partition(&self) -> Option<RolePartition> {
        match self {
            UserRole::Player => Some(RolePartition::Player),
            UserRole::Coach => Some(RolePartition::Coach),
            UserRole::Seller => Some(RolePartition::Store),
            UserRole::Delivery => Some(RolePartition::Delivery),
            UserRole::Admin | UserRole::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Player => ROLE_PLAYER,
            UserRole::Coach => ROLE_COACH,
            UserRole::Seller => ROLE_SELLER,
            UserRole::Delivery => ROLE_DELIVERY,
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Unknown(raw) => raw,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Unknown(String::new())
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            ROLE_PLAYER => UserRole::Player,
            ROLE_COACH => UserRole::Coach,
            ROLE_SELLER | ROLE_STORE => UserRole::Seller,
            ROLE_DELIVERY | "delivery_partner" | "deliverypartner" => UserRole::Delivery,
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::Unknown(s.trim().to_string()),
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Unknown(raw) if raw.is_empty() => write!(f, "unknown"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    Pending,
    Active,
    Rejected,
    Inactive,
    Suspended,
    Unknown(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Pending => STATUS_PENDING,
            UserStatus::Active => STATUS_ACTIVE,
            UserStatus::Rejected => STATUS_REJECTED,
            UserStatus::Inactive => STATUS_INACTIVE,
            UserStatus::Suspended => STATUS_SUSPENDED,
            UserStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, UserStatus::Pending)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, UserStatus::Unknown(_))
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Unknown(String::new())
    }
}

impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            STATUS_PENDING => UserStatus::Pending,
            STATUS_ACTIVE => UserStatus::Active,
            STATUS_REJECTED => UserStatus::Rejected,
            STATUS_INACTIVE => UserStatus::Inactive,
            STATUS_SUSPENDED => UserStatus::Suspended,
            _ => UserStatus::Unknown(s.trim().to_string()),
        }
    }
}

impl From<String> for UserStatus {
    fn from(s: String) -> Self {
        UserStatus::from(s.as_str())
    }
}

impl From<UserStatus> for String {
    fn from(status: UserStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Strict parsing for operator input; unknown values are rejected.
impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match UserStatus::from(s) {
            UserStatus::Unknown(raw) => Err(DomainError::validation(format!(
                "Invalid status '{}'. Must be one of: pending, active, rejected, inactive, suspended",
                raw
            ))),
            status => Ok(status),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Unknown(raw) if raw.is_empty() => write!(f, "unknown"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Structured location as stored on detailed user records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredLocation {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
}

/// User location: either free text or structured fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Text(String),
    Structured(StructuredLocation),
}

impl Location {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Location::Text(s)),
            Value::Object(_) => serde_json::from_value(value)
                .ok()
                .map(Location::Structured),
            _ => None,
        }
    }

    /// One-line rendering for listings.
    pub fn summary(&self) -> String {
        match self {
            Location::Text(text) => text.clone(),
            Location::Structured(loc) => [&loc.address, &loc.city, &loc.state]
                .iter()
                .filter_map(|part| part.as_deref())
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Scalar fields read from a backend user object.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    #[serde(default, deserialize_with = "lenient::string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    email: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    mobile: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    role: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "lenient::datetime")]
    created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A user as seen by the admin console, optionally enriched with role data.
///
/// Fields the console does not model are kept in `extra` so that merging
/// duplicates never loses backend data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub role: UserRole,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Documents::is_empty")]
    pub documents: Documents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_data: Option<RoleProfile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<Value> for UserRecord {
    type Error = DomainError;

    fn try_from(value: Value) -> DomainResult<Self> {
        UserRecord::from_value(value)
    }
}

impl UserRecord {
    /// Create a bare record with only identity, role and status.
    pub fn new(id: impl Into<String>, role: UserRole, status: UserStatus) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            mobile: None,
            role,
            status,
            created_at: None,
            location: None,
            documents: Documents::new(),
            role_data: None,
            extra: Map::new(),
        }
    }

    /// Interpret a backend JSON object as a user record.
    ///
    /// Fails only when the value is not an object or carries no identity.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(DomainError::malformed("user record is not an object"));
        };

        let id = record::record_id(&map)
            .ok_or_else(|| DomainError::malformed("user record has no id"))?;
        map.remove("_id");
        map.remove("id");

        let documents = take_first(&mut map, &["documents", "document"])
            .map(Documents::from_value)
            .unwrap_or_default();
        let role_data = take_first(&mut map, &["roleData"])
            .and_then(|v| RoleProfile::from_value(v).ok());
        let location = take_first(&mut map, &["location"]).and_then(Location::from_value);
        promote_alias(&mut map, "mobile", &["phone"]);

        let raw: RawUser = serde_json::from_value(Value::Object(map))
            .map_err(|e| DomainError::malformed(e.to_string()))?;

        Ok(Self {
            id,
            name: raw.name,
            email: raw.email,
            mobile: raw.mobile,
            role: raw.role.map(UserRole::from).unwrap_or_default(),
            status: raw.status.map(UserStatus::from).unwrap_or_default(),
            created_at: raw.created_at,
            location,
            documents,
            role_data,
            extra: raw.extra,
        })
    }

    /// Display name, falling back to email and then id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Look up an unmodelled field as a string (e.g. `storeName`).
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Merge a duplicate of the same entity into this one.
    ///
    /// Fields already present here win; blank fields are filled from the
    /// duplicate. Nothing is ever replaced with an empty value.
    pub fn absorb(&mut self, other: UserRecord) {
        fill_string(&mut self.name, other.name);
        fill_string(&mut self.email, other.email);
        fill_string(&mut self.mobile, other.mobile);
        if self.role.is_unknown() && !other.role.is_unknown() {
            self.role = other.role;
        }
        if self.status.is_unknown() && !other.status.is_unknown() {
            self.status = other.status;
        }
        if self.created_at.is_none() {
            self.created_at = other.created_at;
        }
        if self.location.is_none() {
            self.location = other.location;
        }
        self.documents.fill_from(other.documents);
        if self.role_data.is_none() {
            self.role_data = other.role_data;
        }
        record::fill_blanks(&mut self.extra, other.extra);
    }

    /// Apply a freshly fetched detail record on top of this one.
    ///
    /// Non-empty detail fields win, but documents and role data that were
    /// gathered earlier are kept when the detail does not carry them.
    pub fn overlay(&mut self, detail: UserRecord) {
        prefer_string(&mut self.name, detail.name);
        prefer_string(&mut self.email, detail.email);
        prefer_string(&mut self.mobile, detail.mobile);
        if !detail.role.is_unknown() {
            self.role = detail.role;
        }
        if !detail.status.is_unknown() {
            self.status = detail.status;
        }
        if detail.created_at.is_some() {
            self.created_at = detail.created_at;
        }
        if detail.location.is_some() {
            self.location = detail.location;
        }
        self.documents.merge_preferring(detail.documents);
        if detail.role_data.is_some() {
            self.role_data = detail.role_data;
        }
        record::overlay_non_blank(&mut self.extra, detail.extra);
    }

    /// Attach a matched role profile and merge its documents.
    ///
    /// Role-specific documents take precedence over user-level ones.
    pub fn attach_profile(&mut self, mut profile: RoleProfile) {
        let role_documents = std::mem::take(&mut profile.documents);
        self.documents.merge_preferring(role_documents.clone());
        profile.documents = role_documents;
        self.role_data = Some(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!(UserRole::from("player"), UserRole::Player);
        assert_eq!(UserRole::from("Store"), UserRole::Seller);
        assert_eq!(UserRole::from("seller"), UserRole::Seller);
        assert_eq!(UserRole::from("delivery-partner"), UserRole::Delivery);
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("umpire"), UserRole::Unknown("umpire".to_string()));
        assert_eq!(UserRole::Seller.partition(), Some(RolePartition::Store));
        assert_eq!(UserRole::Admin.partition(), None);
    }

    #[test]
    fn test_status_strict_parsing() {
        assert_eq!("active".parse::<UserStatus>(), Ok(UserStatus::Active));
        assert_eq!(" Suspended ".parse::<UserStatus>(), Ok(UserStatus::Suspended));
        assert!("approved".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_from_value_reads_either_id_field() {
        let a = UserRecord::from_value(json!({"_id": "A", "role": "seller"})).unwrap();
        let b = UserRecord::from_value(json!({"id": 12, "role": "coach"})).unwrap();

        assert_eq!(a.id, "A");
        assert_eq!(a.role, UserRole::Seller);
        assert_eq!(b.id, "12");
        assert_eq!(b.role, UserRole::Coach);
    }

    #[test]
    fn test_from_value_is_lenient() {
        let user = UserRecord::from_value(json!({
            "_id": "u1",
            "name": "Asha",
            "mobile": 9876543210_u64,
            "status": "pending",
            "createdAt": "not a date",
            "location": {"city": "Pune", "state": "MH"},
            "document": {"pan": "pan.png"},
            "storeName": "Acme"
        }))
        .unwrap();

        assert_eq!(user.mobile.as_deref(), Some("9876543210"));
        assert!(user.created_at.is_none());
        assert_eq!(user.location.unwrap().summary(), "Pune, MH");
        assert!(user.documents.contains("pan"));
        assert_eq!(user.extra["storeName"], "Acme");
    }

    #[test]
    fn test_from_value_requires_identity() {
        assert!(UserRecord::from_value(json!({"name": "ghost"})).is_err());
        assert!(UserRecord::from_value(json!("u1")).is_err());
    }

    #[test]
    fn test_absorb_unions_fields() {
        let mut first = UserRecord::from_value(json!({"_id": "A", "role": "seller"})).unwrap();
        let second = UserRecord::from_value(json!({
            "_id": "A", "role": "seller", "storeName": "Acme", "name": "Owner"
        }))
        .unwrap();

        first.absorb(second);

        assert_eq!(first.extra_str("storeName"), Some("Acme"));
        assert_eq!(first.name.as_deref(), Some("Owner"));
    }

    #[test]
    fn test_absorb_keeps_first_seen_values() {
        let mut first = UserRecord::from_value(json!({"_id": "A", "name": "First"})).unwrap();
        let second = UserRecord::from_value(json!({"_id": "A", "name": "Second"})).unwrap();

        first.absorb(second);

        assert_eq!(first.name.as_deref(), Some("First"));
    }

    #[test]
    fn test_overlay_keeps_known_documents() {
        let mut listed = UserRecord::from_value(json!({
            "_id": "A", "role": "coach", "documents": {"pan": "pan.png"}
        }))
        .unwrap();
        let detail = UserRecord::from_value(json!({
            "_id": "A", "role": "coach", "location": "Mumbai", "name": ""
        }))
        .unwrap();

        listed.overlay(detail);

        assert!(listed.documents.contains("pan"));
        assert_eq!(listed.location, Some(Location::Text("Mumbai".to_string())));
    }

    #[test]
    fn test_serialized_record_round_trips() {
        let user = UserRecord::from_value(json!({
            "_id": "A", "role": "seller", "status": "pending", "storeName": "Acme"
        }))
        .unwrap();

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["_id"], "A");
        assert_eq!(value["storeName"], "Acme");

        let back: UserRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, user);
    }
}
