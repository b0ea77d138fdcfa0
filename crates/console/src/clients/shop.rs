//! Admin shop analytics and store lookups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use common::AppResult;
use domain::{ShopAnalytics, StoreSummary};

use super::http::{resource_path, ApiClient};
use super::normalize::extract_object;
use crate::config::{PATH_SHOP_ANALYTICS, PATH_SHOP_STORES};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Shop endpoints used by the dashboard and the `shop` commands.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ShopBackend: Send + Sync {
    /// Platform-wide shop metrics
    async fn analytics(&self) -> AppResult<ShopAnalytics>;

    /// One store's shop summary
    async fn store(&self, id: &str) -> AppResult<StoreSummary>;
}

pub struct ShopClient {
    api: Arc<ApiClient>,
    analytics_timeout: Duration,
}

impl ShopClient {
    pub fn new(api: Arc<ApiClient>, analytics_timeout: Duration) -> Self {
        Self {
            api,
            analytics_timeout,
        }
    }
}

#[async_trait]
impl ShopBackend for ShopClient {
    async fn analytics(&self) -> AppResult<ShopAnalytics> {
        let body = self
            .api
            .get_with_timeout(PATH_SHOP_ANALYTICS, &[], self.analytics_timeout)
            .await?;
        Ok(ShopAnalytics::from_value(extract_object(body))?)
    }

    async fn store(&self, id: &str) -> AppResult<StoreSummary> {
        let body = self
            .api
            .get_with_timeout(
                &resource_path(PATH_SHOP_STORES, id),
                &[],
                self.analytics_timeout,
            )
            .await?;
        Ok(StoreSummary::from_value(extract_object(body))?)
    }
}
