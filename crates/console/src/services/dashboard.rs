//! Dashboard summary over all users plus shop analytics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use common::AppResult;
use domain::{DashboardSummary, Warning, WarningKind};

use super::aggregator::{AggregationMode, Aggregator};
use crate::clients::ShopBackend;

pub struct DashboardService {
    aggregator: Arc<Aggregator>,
    shop: Arc<dyn ShopBackend>,
}

impl DashboardService {
    pub fn new(aggregator: Arc<Aggregator>, shop: Arc<dyn ShopBackend>) -> Self {
        Self { aggregator, shop }
    }

    /// Counts are recomputed from a fresh aggregation on every call. A shop
    /// analytics failure only adds a warning.
    pub async fn summary(&self, now: DateTime<Utc>) -> AppResult<DashboardSummary> {
        let (view, analytics) = tokio::join!(
            self.aggregator.aggregate(AggregationMode::AllUsers),
            self.shop.analytics()
        );

        let mut summary = DashboardSummary::from_view(&view?, now);
        match analytics {
            Ok(analytics) => summary = summary.with_shop(analytics),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(code = e.code(), "Shop analytics unavailable: {}", e);
                summary.warnings.push(Warning::new(
                    WarningKind::Analytics,
                    format!("Shop analytics unavailable: {}", e.user_message()),
                ));
            }
        }

        info!(
            total_users = summary.total_users,
            pending = summary.pending,
            "Dashboard computed"
        );
        Ok(summary)
    }
}
