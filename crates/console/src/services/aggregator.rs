//! Role aggregator.
//!
//! Fans out one broad listing plus one query per role partition through the
//! request scheduler and reconciles the results into an `AggregatedView`.
//! A failed sub-query degrades to an empty list with a warning; only a dead
//! session aborts the whole aggregation.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use common::{AppError, AppResult};
use domain::{AggregatedView, RolePartition, UserRecord, UserStatus, Warning, WarningKind};

use crate::clients::{Directory, UserQuery};
use crate::scheduler::RequestScheduler;

/// Which population to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// Users awaiting a decision (`status=pending`)
    PendingApprovals,
    /// Every user, for the user-management view and the dashboard
    AllUsers,
}

impl AggregationMode {
    pub fn status_filter(&self) -> Option<UserStatus> {
        match self {
            AggregationMode::PendingApprovals => Some(UserStatus::Pending),
            AggregationMode::AllUsers => None,
        }
    }
}

/// Outcome of one role-scoped query.
pub type ScopedOutcome = (RolePartition, AppResult<Vec<UserRecord>>);

pub struct Aggregator {
    directory: Arc<dyn Directory>,
    scheduler: Arc<RequestScheduler>,
    broad_limit: u32,
}

impl Aggregator {
    pub fn new(
        directory: Arc<dyn Directory>,
        scheduler: Arc<RequestScheduler>,
        broad_limit: u32,
    ) -> Self {
        Self {
            directory,
            scheduler,
            broad_limit,
        }
    }

    /// Load and reconcile every role collection for `mode`.
    pub async fn aggregate(&self, mode: AggregationMode) -> AppResult<AggregatedView> {
        let status = mode.status_filter();
        debug!(?mode, "Aggregating users");

        let broad = self.scheduler.run(
            "users:broad",
            self.directory
                .list_users(UserQuery::broad(status.clone(), self.broad_limit)),
        );
        let scoped = join_all(RolePartition::ALL.into_iter().map(|partition| {
            let query = UserQuery::scoped(partition, status.clone());
            async move {
                let result = self
                    .scheduler
                    .run(partition.query_role(), self.directory.list_users(query))
                    .await;
                (partition, result)
            }
        }));

        let (broad, scoped) = tokio::join!(broad, scoped);
        let view = merge_results(broad, scoped)?;

        info!(
            ?mode,
            players = view.players.len(),
            coaches = view.coaches.len(),
            stores = view.stores.len(),
            delivery = view.delivery.len(),
            warnings = view.warnings.len(),
            "Aggregation complete"
        );
        Ok(view)
    }
}

/// Place a record by its own role, falling back to `fallback` when the role
/// is missing or unrecognised. An id already in the view is merged where it
/// sits. Admin records are never placed.
pub(crate) fn place(view: &mut AggregatedView, fallback: RolePartition, user: UserRecord) -> bool {
    view.upsert(Some(fallback), user)
}

#[derive(Default)]
struct Failures {
    forbidden: bool,
    rate_limited: bool,
    other: Vec<Warning>,
}

impl Failures {
    /// Record a degradable failure, or hand a fatal one back.
    fn absorb(&mut self, source: &str, err: AppError) -> AppResult<()> {
        if err.is_fatal() {
            return Err(err);
        }
        warn!(query = source, code = err.code(), "User query degraded: {}", err);
        match err {
            AppError::Forbidden(_) => self.forbidden = true,
            AppError::RateLimited { .. } => self.rate_limited = true,
            other => self.other.push(Warning::new(
                WarningKind::QueryFailed,
                format!("Could not load {}: {}", source, other.user_message()),
            )),
        }
        Ok(())
    }

    fn into_warnings(self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if self.forbidden {
            warnings.push(Warning::new(
                WarningKind::Permission,
                "You do not have permission to view some users. Please contact your administrator.",
            ));
        }
        if self.rate_limited {
            warnings.push(Warning::new(
                WarningKind::RateLimited,
                "The server is throttling requests, so some lists may be incomplete. Refresh to retry.",
            ));
        }
        warnings.extend(self.other);
        warnings
    }
}

/// Reconcile the broad listing with the role-scoped listings.
///
/// With a non-empty broad listing, it is the source of truth and only the
/// store collection is unioned with the scoped store results. Otherwise the
/// scoped results are used alone. Merging never depends on the order in
/// which the queries completed.
pub fn merge_results(
    broad: AppResult<Vec<UserRecord>>,
    scoped: Vec<ScopedOutcome>,
) -> AppResult<AggregatedView> {
    let mut failures = Failures::default();

    let broad = match broad {
        Ok(records) => records,
        Err(e) => {
            failures.absorb("all users", e)?;
            Vec::new()
        }
    };

    let mut scoped_records: Vec<(RolePartition, Vec<UserRecord>)> = Vec::new();
    for (partition, result) in scoped {
        match result {
            Ok(records) => scoped_records.push((partition, records)),
            Err(e) => failures.absorb(&partition.label().to_lowercase(), e)?,
        }
    }
    scoped_records.sort_by_key(|(partition, _)| *partition);

    let mut view = AggregatedView::new();
    if broad.is_empty() {
        for (partition, records) in scoped_records {
            for user in records {
                place(&mut view, partition, user);
            }
        }
    } else {
        let total = broad.len();
        let mut unplaced = 0;
        for user in broad {
            if !view.insert(user) {
                unplaced += 1;
            }
        }
        if unplaced > 0 {
            debug!(unplaced, total, "Broad listing contained users without a role partition");
        }

        let scoped_stores = scoped_records
            .into_iter()
            .filter(|(partition, _)| *partition == RolePartition::Store)
            .flat_map(|(_, records)| records);
        for user in scoped_stores {
            if user.role.is_unknown() || user.role.partition() == Some(RolePartition::Store) {
                place(&mut view, RolePartition::Store, user);
            }
        }
    }

    for warning in failures.into_warnings() {
        view.push_warning(warning);
    }
    Ok(view)
}
