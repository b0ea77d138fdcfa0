//! Approvals queue: listing, decisions and auto-refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use common::{AppError, AppResult};
use domain::{AggregatedView, ApprovalDecision, UserStatus};

use super::aggregator::{AggregationMode, Aggregator};
use super::enrichment::Enricher;
use crate::clients::Directory;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Yes/no confirmation asked before a decision is sent.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirmation that always agrees (`--yes`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Result of an approve/reject action.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub user_id: String,
    pub name: String,
    pub status: UserStatus,
    /// Pending queue as re-fetched after the change
    pub queue: AggregatedView,
}

pub struct ApprovalService {
    directory: Arc<dyn Directory>,
    aggregator: Arc<Aggregator>,
    enricher: Arc<Enricher>,
}

impl ApprovalService {
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

    /// Current pending queue, optionally with profiles and documents attached.
    pub async fn pending_queue(&self, enrich: bool) -> AppResult<AggregatedView> {
        let view = self
            .aggregator
            .aggregate(AggregationMode::PendingApprovals)
            .await?;
        if enrich {
            self.enricher.enrich_view(view).await
        } else {
            Ok(view)
        }
    }

    /// Apply a decision to a pending user and return the refreshed queue.
    ///
    /// Nothing is sent unless the user is pending and `confirm` agrees. A
    /// failed update is returned as-is without refreshing or retrying.
    pub async fn decide(
        &self,
        user_id: &str,
        decision: ApprovalDecision,
        confirm: &dyn Confirm,
    ) -> AppResult<DecisionOutcome> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("User id is required"));
        }

        let user = self.directory.get_user(user_id).await?;
        let target = decision.check_user(&user)?;

        let prompt = format!(
            "{} {} ({}, {})?",
            capitalize(decision.verb()),
            user.display_name(),
            user.role,
            user.id
        );
        if !confirm.confirm(&prompt) {
            info!(user_id, %decision, "Decision cancelled");
            return Err(AppError::Cancelled);
        }

        self.directory.update_status(&user.id, target.clone()).await?;
        info!(user_id, %decision, status = %target, "Decision recorded");

        let queue = self
            .aggregator
            .aggregate(AggregationMode::PendingApprovals)
            .await?;

        Ok(DecisionOutcome {
            user_id: user.id.clone(),
            name: user.display_name().to_string(),
            status: target,
            queue,
        })
    }

    /// Re-fetch the pending queue every `interval` until `shutdown` resolves.
    ///
    /// Non-fatal failures are reported to `on_refresh` and polling continues.
    /// A fatal failure ends the loop. Returns the number of completed rounds.
    /// A zero `interval` is rejected before anything is fetched.
    pub async fn watch<F, S>(
        &self,
        interval: Duration,
        enrich: bool,
        mut on_refresh: F,
        shutdown: S,
    ) -> AppResult<usize>
    where
        F: FnMut(Result<&AggregatedView, &AppError>),
        S: Future<Output = ()>,
    {
        if interval.is_zero() {
            return Err(AppError::validation(
                "Refresh interval must be at least one second",
            ));
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut rounds = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = self.pending_queue(enrich) => result,
            };
            rounds += 1;

            match result {
                Ok(view) => on_refresh(Ok(&view)),
                Err(e) if e.is_fatal() => {
                    error!(rounds, "Approvals watch stopped: {}", e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(rounds, code = e.code(), "Approvals refresh failed: {}", e);
                    on_refresh(Err(&e));
                }
            }
        }

        info!(rounds, "Approvals watch stopped");
        Ok(rounds)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use common::SchedulerConfig;
    use domain::{UserRecord, UserRole};
    use mockall::predicate::eq;

    use crate::clients::MockDirectory;
    use crate::scheduler::RequestScheduler;

    fn service(directory: MockDirectory) -> ApprovalService {
        let directory: Arc<dyn Directory> = Arc::new(directory);
        let scheduler = Arc::new(RequestScheduler::new(&SchedulerConfig {
            max_concurrent: 4,
            burst: 100,
            refill_interval_ms: 1,
        }));
        ApprovalService::new(
            directory.clone(),
            Arc::new(Aggregator::new(directory.clone(), scheduler.clone(), 1000)),
            Arc::new(Enricher::new(directory, scheduler)),
        )
    }

    fn pending_coach() -> UserRecord {
        let mut user = UserRecord::new("c1", UserRole::Coach, UserStatus::Pending);
        user.name = Some("Asha".to_string());
        user
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("approve"), "Approve");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_assume_yes() {
        assert!(AssumeYes.confirm("Approve?"));
    }

    #[tokio::test]
    async fn test_approve_updates_and_refreshes_queue() {
        let approved = Arc::new(AtomicBool::new(false));
        let mut directory = MockDirectory::new();

        directory
            .expect_get_user()
            .withf(|id| id == "c1")
            .times(1)
            .returning(|_| Ok(pending_coach()));
        let flag = approved.clone();
        directory
            .expect_update_status()
            .with(eq("c1"), eq(UserStatus::Active))
            .times(1)
            .returning(move |_, _| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            });
        let flag = approved.clone();
        directory.expect_list_users().returning(move |query| {
            if flag.load(Ordering::SeqCst) || query.role != Some(domain::RolePartition::Coach) {
                Ok(Vec::new())
            } else {
                Ok(vec![pending_coach()])
            }
        });

        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .withf(|prompt| prompt == "Approve Asha (coach, c1)?")
            .times(1)
            .returning(|_| true);

        let outcome = service(directory)
            .decide("c1", ApprovalDecision::Approve, &confirm)
            .await
            .unwrap();

        assert_eq!(outcome.status, UserStatus::Active);
        assert!(!outcome.queue.contains("c1"));
        assert!(approved.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_decision_on_active_user_is_rejected_locally() {
        let mut directory = MockDirectory::new();
        directory.expect_get_user().returning(|id| {
            Ok(UserRecord::new(id, UserRole::Seller, UserStatus::Active))
        });
        directory.expect_update_status().times(0);
        directory.expect_list_users().times(0);

        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().times(0);

        let err = service(directory)
            .decide("s1", ApprovalDecision::Reject, &confirm)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_declined_confirmation_sends_nothing() {
        let mut directory = MockDirectory::new();
        directory.expect_get_user().returning(|_| Ok(pending_coach()));
        directory.expect_update_status().times(0);

        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().times(1).returning(|_| false);

        let err = service(directory)
            .decide("c1", ApprovalDecision::Reject, &confirm)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cancelled));
    }

    #[tokio::test]
    async fn test_blank_id_is_validation_error() {
        let mut directory = MockDirectory::new();
        directory.expect_get_user().times(0);

        let err = service(directory)
            .decide("   ", ApprovalDecision::Approve, &AssumeYes)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_polls_until_shutdown() {
        let mut directory = MockDirectory::new();
        directory.expect_list_users().returning(|_| Ok(Vec::new()));

        let mut refreshes = 0;
        let rounds = service(directory)
            .watch(
                Duration::from_secs(30),
                false,
                |result| {
                    assert!(result.is_ok());
                    refreshes += 1;
                },
                tokio::time::sleep(Duration::from_secs(65)),
            )
            .await
            .unwrap();

        assert_eq!(rounds, 3);
        assert_eq!(refreshes, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_stops_when_session_expires() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut directory = MockDirectory::new();
        // One aggregation is five listing calls.
        directory.expect_list_users().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < 5 {
                Ok(Vec::new())
            } else {
                Err(AppError::SessionExpired)
            }
        });

        let mut refreshes = 0;
        let err = service(directory)
            .watch(
                Duration::from_secs(30),
                false,
                |_| refreshes += 1,
                std::future::pending::<()>(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SessionExpired));
        assert_eq!(refreshes, 1);
    }

    #[tokio::test]
    async fn test_watch_rejects_zero_interval() {
        let mut directory = MockDirectory::new();
        directory.expect_list_users().times(0);

        let err = service(directory)
            .watch(Duration::ZERO, false, |_| {}, std::future::pending::<()>())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }
}
