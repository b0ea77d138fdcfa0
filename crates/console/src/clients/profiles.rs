//! Role-profile rosters (coaches, stores, delivery partners).

use std::sync::Arc;

use tracing::debug;

use common::AppResult;
use domain::{RolePartition, RoleProfile};

use super::http::ApiClient;
use super::normalize::{extract_records, parse_records};
use crate::config::{PATH_COACHES, PATH_DELIVERY_AVAILABLE, PATH_STORES};

/// Roster endpoint for a role, if the role has profiles.
///
/// Delivery partners are only listed through the "available" endpoint.
pub fn roster_path(partition: RolePartition) -> Option<&'static str> {
    match partition {
        RolePartition::Coach => Some(PATH_COACHES),
        RolePartition::Store => Some(PATH_STORES),
        RolePartition::Delivery => Some(PATH_DELIVERY_AVAILABLE),
        RolePartition::Player => None,
    }
}

pub struct ProfileClient {
    api: Arc<ApiClient>,
}

impl ProfileClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Full roster for a role; players have none.
    pub async fn roster(&self, partition: RolePartition) -> AppResult<Vec<RoleProfile>> {
        let Some(path) = roster_path(partition) else {
            return Ok(Vec::new());
        };
        let body = self.api.get(path, &[]).await?;
        let profiles = parse_records(extract_records(body), "profile", RoleProfile::from_value);
        debug!(role = %partition, count = profiles.len(), "Fetched roster");
        Ok(profiles)
    }
}
