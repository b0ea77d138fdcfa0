//! User-management view: every user, any administrative status.

use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};
use domain::{validate_admin_status, AggregatedView, RolePartition, UserRecord, UserStatus, Warning};

use super::aggregator::{AggregationMode, Aggregator};
use super::enrichment::Enricher;
use crate::clients::Directory;

/// Listing filters applied on top of the all-users aggregation.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<RolePartition>,
    pub status: Option<UserStatus>,
    /// Case-insensitive match on name, email or mobile, or the exact id
    /// ignoring case
    pub search: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &UserRecord) -> bool {
        if let Some(status) = &self.status {
            if &user.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let lowered = needle.to_lowercase();
                [&user.name, &user.email, &user.mobile]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&lowered))
                    || user.id.eq_ignore_ascii_case(needle)
            }
            None => true,
        }
    }

    /// Keep only matching users; collections outside `role` are emptied.
    pub fn apply(&self, mut view: AggregatedView) -> AggregatedView {
        for partition in RolePartition::ALL {
            let keep_role = self.role.map(|r| r == partition).unwrap_or(true);
            let collection = view.collection_mut(partition);
            if keep_role {
                collection.retain(|user| self.matches(user));
            } else {
                collection.clear();
            }
        }
        view
    }
}

/// A single user with whatever problems were met while enriching it.
#[derive(Debug, Clone)]
pub struct UserDetail {
    pub user: UserRecord,
    pub warnings: Vec<Warning>,
}

pub struct UserManager {
    directory: Arc<dyn Directory>,
    aggregator: Arc<Aggregator>,
    enricher: Arc<Enricher>,
}

impl UserManager {
    pub fn new(
        directory: Arc<dyn Directory>,
        aggregator: Arc<Aggregator>,
        enricher: Arc<Enricher>,
    ) -> Self {
        Self {
            directory,
            aggregator,
            enricher,
        }
    }

    pub async fn list(&self, filter: &UserFilter) -> AppResult<AggregatedView> {
        let view = self.aggregator.aggregate(AggregationMode::AllUsers).await?;
        Ok(filter.apply(view))
    }

    /// Full record of one user with role profile and merged documents.
    pub async fn show(&self, user_id: &str) -> AppResult<UserDetail> {
        let user = self.directory.get_user(required(user_id)?).await?;
        let mut warnings = Vec::new();
        let user = self.enricher.enrich_one(user, &mut warnings).await?;
        Ok(UserDetail { user, warnings })
    }

    /// Set any administrative status and return the re-fetched record.
    pub async fn set_status(&self, user_id: &str, status: UserStatus) -> AppResult<UserRecord> {
        let user = self.directory.get_user(required(user_id)?).await?;
        validate_admin_status(&user.status, &status)?;

        self.directory.update_status(&user.id, status.clone()).await?;
        info!(user_id = %user.id, from = %user.status, to = %status, "User status changed");

        self.directory.get_user(&user.id).await
    }
}

fn required(user_id: &str) -> AppResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        Err(AppError::validation("User id is required"))
    } else {
        Ok(trimmed)
    }
}
