//! Profile enrichment.
//!
//! Attaches the full user record, the matching role profile and the merged
//! documents to users that were loaded from listing endpoints. Enrichment is
//! additive: a miss or a failed fetch keeps whatever the record already had.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use common::{AppError, AppResult};
use domain::{AggregatedView, RolePartition, RoleProfile, UserRecord, Warning, WarningKind};

use super::aggregator::place;
use crate::clients::Directory;
use crate::config::ENRICHMENT_CONCURRENCY;
use crate::scheduler::RequestScheduler;

/// Roster entry whose `userId` points at `user_id`.
pub fn find_profile<'a>(profiles: &'a [RoleProfile], user_id: &str) -> Option<&'a RoleProfile> {
    profiles.iter().find(|profile| profile.belongs_to(user_id))
}

pub struct Enricher {
    directory: Arc<dyn Directory>,
    scheduler: Arc<RequestScheduler>,
}

impl Enricher {
    pub fn new(directory: Arc<dyn Directory>, scheduler: Arc<RequestScheduler>) -> Self {
        Self {
            directory,
            scheduler,
        }
    }

    /// Enrich a single user, collecting non-fatal problems in `warnings`.
    pub async fn enrich_one(
        &self,
        mut user: UserRecord,
        warnings: &mut Vec<Warning>,
    ) -> AppResult<UserRecord> {
        match self.fetch_detail(&user.id).await {
            Ok(detail) => user.overlay(detail),
            Err(e) => warnings.push(degrade_detail(&user, e)?),
        }

        let Some(partition) = user.role.partition().filter(RolePartition::has_profile) else {
            return Ok(user);
        };
        match self.fetch_roster(partition).await {
            Ok(roster) => attach_from(&mut user, &roster),
            Err(e) => warnings.push(degrade_roster(partition, e)?),
        }
        Ok(user)
    }

    /// Enrich every user of a view.
    ///
    /// Each roster is fetched at most once per pass, including rosters for
    /// roles that only show up in a user's detail record. Detail fetches run
    /// with bounded concurrency and keep the order of the collections.
    pub async fn enrich_view(&self, view: AggregatedView) -> AppResult<AggregatedView> {
        let AggregatedView {
            players,
            coaches,
            stores,
            delivery,
            warnings,
        } = view;

        let mut enriched = AggregatedView::new();
        for warning in warnings {
            enriched.push_warning(warning);
        }

        let wanted: Vec<RolePartition> = [
            (RolePartition::Coach, coaches.is_empty()),
            (RolePartition::Store, stores.is_empty()),
            (RolePartition::Delivery, delivery.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| !empty)
        .map(|(partition, _)| partition)
        .collect();

        let roster_results = join_all(wanted.into_iter().map(|partition| async move {
            (partition, self.fetch_roster(partition).await)
        }))
        .await;

        let mut rosters: HashMap<RolePartition, Vec<RoleProfile>> = HashMap::new();
        let mut unavailable: HashSet<RolePartition> = HashSet::new();
        for (partition, result) in roster_results {
            match result {
                Ok(roster) => {
                    rosters.insert(partition, roster);
                }
                Err(e) => {
                    enriched.push_warning(degrade_roster(partition, e)?);
                    unavailable.insert(partition);
                }
            }
        }

        let members: Vec<(RolePartition, UserRecord)> = [
            (RolePartition::Player, players),
            (RolePartition::Coach, coaches),
            (RolePartition::Store, stores),
            (RolePartition::Delivery, delivery),
        ]
        .into_iter()
        .flat_map(|(partition, users)| users.into_iter().map(move |user| (partition, user)))
        .collect();
        let total = members.len();

        let details: Vec<_> = stream::iter(members)
            .map(|(partition, user)| async move {
                let detail = self.fetch_detail(&user.id).await;
                (partition, user, detail)
            })
            .buffered(ENRICHMENT_CONCURRENCY)
            .collect()
            .await;

        for (partition, mut user, detail) in details {
            match detail {
                Ok(detail) => user.overlay(detail),
                Err(e) => enriched.push_warning(degrade_detail(&user, e)?),
            }

            // The detail record may carry a different role than the listing.
            let target = user.role.partition().unwrap_or(partition);
            let missing = !rosters.contains_key(&target) && !unavailable.contains(&target);
            if target.has_profile() && missing {
                match self.fetch_roster(target).await {
                    Ok(roster) => {
                        rosters.insert(target, roster);
                    }
                    Err(e) => {
                        enriched.push_warning(degrade_roster(target, e)?);
                        unavailable.insert(target);
                    }
                }
            }
            if let Some(roster) = rosters.get(&target) {
                attach_from(&mut user, roster);
            }
            place(&mut enriched, partition, user);
        }

        debug!(
            users = total,
            rosters = rosters.len(),
            warnings = enriched.warnings.len(),
            "Enrichment pass complete"
        );
        Ok(enriched)
    }

    async fn fetch_detail(&self, id: &str) -> AppResult<UserRecord> {
        self.scheduler
            .run("users:detail", self.directory.get_user(id))
            .await
    }

    async fn fetch_roster(&self, partition: RolePartition) -> AppResult<Vec<RoleProfile>> {
        self.scheduler
            .run("profiles:roster", self.directory.list_profiles(partition))
            .await
    }
}

fn attach_from(user: &mut UserRecord, roster: &[RoleProfile]) {
    match find_profile(roster, &user.id) {
        Some(profile) => user.attach_profile(profile.clone()),
        None => debug!(user_id = %user.id, "No role profile matched"),
    }
}

fn degrade_detail(user: &UserRecord, err: AppError) -> AppResult<Warning> {
    if err.is_fatal() {
        return Err(err);
    }
    warn!(user_id = %user.id, code = err.code(), "User detail unavailable: {}", err);
    Ok(Warning::new(
        WarningKind::Enrichment,
        format!(
            "Could not load full details for {}: {}",
            user.display_name(),
            err.user_message()
        ),
    ))
}

fn degrade_roster(partition: RolePartition, err: AppError) -> AppResult<Warning> {
    if err.is_fatal() {
        return Err(err);
    }
    warn!(role = %partition, code = err.code(), "Profile roster unavailable: {}", err);
    Ok(Warning::new(
        WarningKind::Enrichment,
        format!(
            "{} profiles could not be loaded: {}",
            partition.label(),
            err.user_message()
        ),
    ))
}
