//! Per-load aggregated view of users bucketed by role.

use serde::Serialize;

use crate::profile::RolePartition;
use crate::user::UserRecord;

/// Category of a user-visible warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Permission,
    RateLimited,
    QueryFailed,
    Enrichment,
    Analytics,
}

/// A non-fatal problem encountered while building a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Four disjoint role collections plus the warnings raised while loading them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedView {
    pub players: Vec<UserRecord>,
    pub coaches: Vec<UserRecord>,
    pub stores: Vec<UserRecord>,
    pub delivery: Vec<UserRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl AggregatedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self, partition: RolePartition) -> &[UserRecord] {
        match partition {
            RolePartition::Player => &self.players,
            RolePartition::Coach => &self.coaches,
            RolePartition::Store => &self.stores,
            RolePartition::Delivery => &self.delivery,
        }
    }

    pub fn collection_mut(&mut self, partition: RolePartition) -> &mut Vec<UserRecord> {
        match partition {
            RolePartition::Player => &mut self.players,
            RolePartition::Coach => &mut self.coaches,
            RolePartition::Store => &mut self.stores,
            RolePartition::Delivery => &mut self.delivery,
        }
    }

    /// Place a record in the collection of its own role.
    ///
    /// Returns `false` when the role has no partition (admin or unknown) and
    /// the record was dropped.
    pub fn insert(&mut self, user: UserRecord) -> bool {
        self.upsert(None, user)
    }

    /// Merge a record into the view so that every id sits in exactly one
    /// collection.
    ///
    /// A known id absorbs the record wherever it already is, and moves when
    /// the merge gives it the role of another partition. A new id goes to its
    /// own role's collection, or to `fallback` when the role is unknown.
    /// Returns `false` when the record was dropped (admin, or unknown role
    /// without a fallback).
    pub fn upsert(&mut self, fallback: Option<RolePartition>, user: UserRecord) -> bool {
        if let Some((current, index)) = self.position(&user.id) {
            let collection = self.collection_mut(current);
            collection[index].absorb(user);
            if let Some(target) = collection[index].role.partition() {
                if target != current {
                    let moved = collection.remove(index);
                    self.collection_mut(target).push(moved);
                }
            }
            return true;
        }

        let target = if user.role.is_unknown() {
            fallback
        } else {
            user.role.partition()
        };
        match target {
            Some(partition) => {
                self.collection_mut(partition).push(user);
                true
            }
            None => false,
        }
    }

    fn position(&self, id: &str) -> Option<(RolePartition, usize)> {
        RolePartition::ALL.into_iter().find_map(|partition| {
            self.collection(partition)
                .iter()
                .position(|user| user.id == id)
                .map(|index| (partition, index))
        })
    }

    /// Total number of users across every collection.
    pub fn len(&self) -> usize {
        RolePartition::ALL
            .iter()
            .map(|p| self.collection(*p).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (RolePartition, &UserRecord)> {
        RolePartition::ALL
            .into_iter()
            .flat_map(move |p| self.collection(p).iter().map(move |u| (p, u)))
    }

    pub fn find(&self, id: &str) -> Option<&UserRecord> {
        self.iter().map(|(_, user)| user).find(|user| user.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Record a warning unless an identical one is already present.
    pub fn push_warning(&mut self, warning: Warning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

/// Collapse records sharing an id, keeping first-seen order.
pub fn dedup_by_id(records: impl IntoIterator<Item = UserRecord>) -> Vec<UserRecord> {
    let mut merged: Vec<UserRecord> = Vec::new();
    for record in records {
        match merged.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => existing.absorb(record),
            None => merged.push(record),
        }
    }
    merged
}
