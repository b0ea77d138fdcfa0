//! The user directory as seen by the approval and management services.

use std::sync::Arc;

use async_trait::async_trait;

use common::AppResult;
use domain::{RolePartition, RoleProfile, UserRecord, UserStatus};

use super::http::ApiClient;
use super::profiles::ProfileClient;
use super::users::{UserClient, UserQuery};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Backend operations needed to aggregate, enrich and decide on users.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// List users matching a query (any envelope shape)
    async fn list_users(&self, query: UserQuery) -> AppResult<Vec<UserRecord>>;

    /// Fetch the full record of one user
    async fn get_user(&self, id: &str) -> AppResult<UserRecord>;

    /// Set a user's status
    async fn update_status(&self, id: &str, status: UserStatus) -> AppResult<()>;

    /// Fetch the profile roster of a role
    async fn list_profiles(&self, partition: RolePartition) -> AppResult<Vec<RoleProfile>>;
}

/// `Directory` backed by the REST API.
pub struct BackendDirectory {
    users: UserClient,
    profiles: ProfileClient,
}

impl BackendDirectory {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            users: UserClient::new(api.clone()),
            profiles: ProfileClient::new(api),
        }
    }
}

#[async_trait]
impl Directory for BackendDirectory {
    async fn list_users(&self, query: UserQuery) -> AppResult<Vec<UserRecord>> {
        self.users.list(&query).await
    }

    async fn get_user(&self, id: &str) -> AppResult<UserRecord> {
        self.users.get(id).await
    }

    async fn update_status(&self, id: &str, status: UserStatus) -> AppResult<()> {
        self.users.update_status(id, &status).await
    }

    async fn list_profiles(&self, partition: RolePartition) -> AppResult<Vec<RoleProfile>> {
        self.profiles.roster(partition).await
    }
}
