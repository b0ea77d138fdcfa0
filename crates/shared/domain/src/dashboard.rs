//! Dashboard counters derived from an aggregated view.
//!
//! Nothing here is stored; the summary is recomputed on every load.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::constants::RECENT_REGISTRATION_DAYS;
use crate::profile::RolePartition;
use crate::shop::ShopAnalytics;
use crate::user::UserStatus;
use crate::view::{AggregatedView, Warning};

/// Percentage of `part` in `whole`, rounded to one decimal; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleCount {
    pub role: RolePartition,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: usize,
    pub roles: Vec<RoleCount>,
    pub statuses: BTreeMap<String, usize>,
    pub pending: usize,
    /// Active share of decided registrations (active + rejected).
    pub approval_rate: f64,
    pub recent_registrations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<ShopAnalytics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl DashboardSummary {
    pub fn from_view(view: &AggregatedView, now: DateTime<Utc>) -> Self {
        let total_users = view.len();
        let cutoff = now - Duration::days(RECENT_REGISTRATION_DAYS);

        let roles = RolePartition::ALL
            .iter()
            .map(|partition| {
                let count = view.collection(*partition).len();
                RoleCount {
                    role: *partition,
                    count,
                    percentage: percentage(count, total_users),
                }
            })
            .collect();

        let mut statuses: BTreeMap<String, usize> = BTreeMap::new();
        let mut recent_registrations = 0;
        for (_, user) in view.iter() {
            *statuses.entry(user.status.to_string()).or_default() += 1;
            if user.created_at.map(|at| at >= cutoff).unwrap_or(false) {
                recent_registrations += 1;
            }
        }

        let count_of = |status: &UserStatus| statuses.get(&status.to_string()).copied().unwrap_or(0);
        let pending = count_of(&UserStatus::Pending);
        let active = count_of(&UserStatus::Active);
        let rejected = count_of(&UserStatus::Rejected);

        Self {
            total_users,
            roles,
            pending,
            approval_rate: percentage(active, active + rejected),
            recent_registrations,
            statuses,
            shop: None,
            warnings: view.warnings.clone(),
        }
    }

    pub fn with_shop(mut self, shop: ShopAnalytics) -> Self {
        self.shop = Some(shop);
        self
    }

    pub fn role(&self, partition: RolePartition) -> Option<&RoleCount> {
        self.roles.iter().find(|r| r.role == partition)
    }
}
