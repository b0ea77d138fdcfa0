//! Role-specific profiles (coach, store, delivery partner).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{ROLE_COACH, ROLE_DELIVERY, ROLE_PLAYER, ROLE_SELLER};
use crate::documents::Documents;
use crate::error::{DomainError, DomainResult};
use crate::record::{normalize_id, record_id, scalar_string, take_first};

/// The four role buckets used by the approvals queue and user management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolePartition {
    Player,
    Coach,
    Store,
    Delivery,
}

impl RolePartition {
    pub const ALL: [RolePartition; 4] = [
        RolePartition::Player,
        RolePartition::Coach,
        RolePartition::Store,
        RolePartition::Delivery,
    ];

    /// Value sent as the `role` query parameter.
    pub fn query_role(&self) -> &'static str {
        match self {
            RolePartition::Player => ROLE_PLAYER,
            RolePartition::Coach => ROLE_COACH,
            RolePartition::Store => ROLE_SELLER,
            RolePartition::Delivery => ROLE_DELIVERY,
        }
    }

    /// Plural heading for listings.
    pub fn label(&self) -> &'static str {
        match self {
            RolePartition::Player => "Players",
            RolePartition::Coach => "Coaches",
            RolePartition::Store => "Stores",
            RolePartition::Delivery => "Delivery partners",
        }
    }

    /// Whether the backend keeps a separate profile roster for this role.
    pub fn has_profile(&self) -> bool {
        !matches!(self, RolePartition::Player)
    }
}

impl FromStr for RolePartition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::user::UserRole::from(s).partition() {
            Some(partition) => Ok(partition),
            None => Err(DomainError::validation(format!(
                "Invalid role '{}'. Must be one of: player, coach, store, delivery",
                s.trim()
            ))),
        }
    }
}

impl std::fmt::Display for RolePartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RolePartition::Player => "player",
            RolePartition::Coach => "coach",
            RolePartition::Store => "store",
            RolePartition::Delivery => "delivery",
        };
        write!(f, "{}", name)
    }
}

/// A coach, store or delivery profile linked to a user by `userId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct RoleProfile {
    #[serde(rename = "_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Documents::is_empty")]
    pub documents: Documents,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl TryFrom<Value> for RoleProfile {
    type Error = DomainError;

    fn try_from(value: Value) -> DomainResult<Self> {
        RoleProfile::from_value(value)
    }
}

impl RoleProfile {
    /// Interpret a roster entry. The `userId` back-reference may be a bare
    /// id or a populated user object.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(DomainError::malformed("profile record is not an object"));
        };

        let id = record_id(&map).unwrap_or_default();
        map.remove("_id");
        map.remove("id");

        let user_id = take_first(&mut map, &["userId", "user"])
            .as_ref()
            .and_then(normalize_id);
        let documents = take_first(&mut map, &["documents", "document"])
            .map(Documents::from_value)
            .unwrap_or_default();

        Ok(Self {
            id,
            user_id,
            documents,
            attributes: map,
        })
    }

    /// Whether this profile points back at the given user.
    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id.trim())
    }

    /// Scalar attribute rendered as a string.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(scalar_string)
    }

    /// Typed view of the role-specific attributes.
    pub fn details(&self, partition: RolePartition) -> ProfileDetails {
        match partition {
            RolePartition::Coach => ProfileDetails::Coach {
                experience: self.attribute("experience"),
                sports: self.list_attribute(&["sports", "sport", "specialization"]),
            },
            RolePartition::Store => ProfileDetails::Store {
                store_name: self.attribute("storeName").or_else(|| self.attribute("name")),
                gst_number: self
                    .attribute("gstNumber")
                    .or_else(|| self.attribute("gst")),
                address: self.address(),
            },
            RolePartition::Delivery => ProfileDetails::Delivery {
                vehicle_type: self.attribute("vehicleType"),
                vehicle_number: self.attribute("vehicleNumber"),
                license_number: self
                    .attribute("licenseNumber")
                    .or_else(|| self.attribute("drivingLicenseNumber")),
            },
            RolePartition::Player => ProfileDetails::None,
        }
    }

    fn list_attribute(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .filter_map(|key| self.attributes.get(*key))
            .flat_map(|value| match value {
                Value::Array(items) => items.iter().filter_map(scalar_string).collect::<Vec<_>>(),
                other => scalar_string(other)
                    .map(|s| s.split(',').map(|p| p.trim().to_string()).collect::<Vec<_>>())
                    .unwrap_or_default(),
            })
            .filter(|s: &String| !s.is_empty())
            .collect()
    }

    fn address(&self) -> Option<String> {
        match self.attributes.get("address")? {
            Value::Object(parts) => {
                let joined = ["street", "city", "state", "pincode"]
                    .iter()
                    .filter_map(|key| parts.get(*key).and_then(scalar_string))
                    .collect::<Vec<_>>()
                    .join(", ");
                (!joined.is_empty()).then_some(joined)
            }
            other => scalar_string(other),
        }
    }
}

/// Role-specific attributes in typed form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileDetails {
    Coach {
        experience: Option<String>,
        sports: Vec<String>,
    },
    Store {
        store_name: Option<String>,
        gst_number: Option<String>,
        address: Option<String>,
    },
    Delivery {
        vehicle_type: Option<String>,
        vehicle_number: Option<String>,
        license_number: Option<String>,
    },
    None,
}
