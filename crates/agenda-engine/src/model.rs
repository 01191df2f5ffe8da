//! Schedules, items and the intervals they occupy.
//!
//! A [`Schedule`] exclusively owns its [`Item`]s. Items never move between
//! schedules and none outlives its schedule. The share state of a schedule is
//! not a plain field: it can only be read here and advanced by
//! [`crate::share`].

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::share::{Share, ShareState};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifier of a schedule, assigned by the storage collaborator.
    ScheduleId
);
id_type!(
    /// Identifier of an item, assigned by the storage collaborator.
    ItemId
);
id_type!(
    /// Reference to the owning user. The engine only compares these.
    UserId
);

/// The top-level program an organizer builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    /// Required; empty or whitespace-only counts as missing.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Required; `None` counts as missing.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub capacity: Option<u32>,
    pub owner: UserId,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    share: ShareState,
}

impl Schedule {
    /// A fresh, unshared schedule.
    pub fn new(
        id: ScheduleId,
        owner: UserId,
        title: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            date,
            capacity: None,
            owner,
            updated_at: None,
            share: ShareState::Unshared,
        }
    }

    /// Rehydrate a schedule whose share was previously persisted.
    ///
    /// A schedule that already carries a share keeps it; `share` is ignored.
    pub fn with_share(mut self, share: Share) -> Self {
        self.record_share(share);
        self
    }

    pub fn share_state(&self) -> &ShareState {
        &self.share
    }

    pub fn share(&self) -> Option<&Share> {
        self.share.share()
    }

    pub fn is_shared(&self) -> bool {
        self.share.is_shared()
    }

    /// Record the outcome of a share transition. A share that is already set
    /// is kept.
    pub(crate) fn record_share(&mut self, share: Share) {
        if !self.share.is_shared() {
            self.share = ShareState::Shared(share);
        }
    }
}

/// A single timed entry within a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub schedule: ScheduleId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Display ordering only; need not be unique or contiguous.
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub description: Option<String>,
}

impl Item {
    /// End strictly after start.
    pub fn has_valid_range(&self) -> bool {
        self.end > self.start
    }

    pub fn interval(&self) -> Interval {
        Interval {
            id: self.id,
            start: self.start,
            end: self.end,
        }
    }
}

/// The `(id, start, end)` triple the conflict detector works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub id: ItemId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(id: ItemId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { id, start, end }
    }
}

/// Collect the intervals of a set of items.
pub fn intervals(items: &[Item]) -> Vec<Interval> {
    items.iter().map(Item::interval).collect()
}

/// Position for an item created without one: one past the highest in use,
/// or 1 for an empty schedule.
pub fn next_position(items: &[Item]) -> u32 {
    items
        .iter()
        .map(|item| item.position)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Items in display order: position, then start, then id.
pub fn sorted_for_display(items: &[Item]) -> Vec<Item> {
    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| (item.position, item.start, item.id));
    sorted
}
