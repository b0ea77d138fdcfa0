//! User listing, detail and status endpoints.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use common::{AppResult, OptionExt};
use domain::{RolePartition, UserRecord, UserStatus};

use super::http::{resource_path, ApiClient};
use super::normalize::{extract_object, extract_records, parse_users};
use crate::config::PATH_USERS;

/// Filters for `GET /api/users`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub role: Option<RolePartition>,
    pub status: Option<UserStatus>,
    pub limit: Option<u32>,
}

impl UserQuery {
    /// Every user with `status`, across roles.
    pub fn broad(status: Option<UserStatus>, limit: u32) -> Self {
        Self {
            role: None,
            status,
            limit: Some(limit),
        }
    }

    /// Users of one role partition.
    pub fn scoped(role: RolePartition, status: Option<UserStatus>) -> Self {
        Self {
            role: Some(role),
            status,
            limit: None,
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(role) = &self.role {
            params.push(("role", role.query_role().to_string()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Client for the `/api/users` resource.
pub struct UserClient {
    api: Arc<ApiClient>,
}

impl UserClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<UserRecord>> {
        let body = self.api.get(PATH_USERS, &query.to_params()).await?;
        let users = parse_users(extract_records(body));
        debug!(count = users.len(), ?query, "Listed users");
        Ok(users)
    }

    pub async fn get(&self, id: &str) -> AppResult<UserRecord> {
        let body = self.api.get(&resource_path(PATH_USERS, id), &[]).await?;
        let record = Some(extract_object(body))
            .filter(Value::is_object)
            .ok_or_not_found(format!("User {}", id))?;
        Ok(UserRecord::from_value(record)?)
    }

    pub async fn update_status(&self, id: &str, status: &UserStatus) -> AppResult<()> {
        self.api
            .put(&resource_path(PATH_USERS, id), &json!({ "status": status }))
            .await?;
        info!(user_id = id, %status, "User status updated");
        Ok(())
    }
}
