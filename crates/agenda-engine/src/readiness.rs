//! Derive whether a schedule may be shared.
//!
//! Readiness is never stored. [`evaluate`] recomputes it from the schedule and
//! its current items on every call and reports every failing check, not just
//! the first, in a fixed order:
//!
//! 1. [`Reason::MissingTitle`]
//! 2. [`Reason::MissingDate`]
//! 3. [`Reason::NoItems`]
//! 4. [`Reason::InvalidTimeRange`] per item, in input order
//! 5. [`Reason::ConflictingItems`] per unordered pair, sorted by id

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::conflicting_pairs;
use crate::model::{intervals, Item, ItemId, Schedule};

/// A single failed readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Reason {
    MissingTitle,
    MissingDate,
    NoItems,
    InvalidTimeRange { item: ItemId },
    ConflictingItems { first: ItemId, second: ItemId },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::MissingTitle => write!(f, "title is missing"),
            Reason::MissingDate => write!(f, "date is missing"),
            Reason::NoItems => write!(f, "program has no items"),
            Reason::InvalidTimeRange { item } => {
                write!(f, "item {} does not end after it starts", item)
            }
            Reason::ConflictingItems { first, second } => {
                write!(f, "items {} and {} overlap", first, second)
            }
        }
    }
}

/// Outcome of a readiness evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    /// True iff `reasons` is empty.
    pub ready: bool,
    pub reasons: Vec<Reason>,
}

impl Readiness {
    fn from_reasons(reasons: Vec<Reason>) -> Self {
        Self {
            ready: reasons.is_empty(),
            reasons,
        }
    }
}

/// Run every readiness check against a schedule and its full item set.
pub fn evaluate(schedule: &Schedule, items: &[Item]) -> Readiness {
    let mut reasons = Vec::new();

    if schedule.title.trim().is_empty() {
        reasons.push(Reason::MissingTitle);
    }
    if schedule.date.is_none() {
        reasons.push(Reason::MissingDate);
    }
    if items.is_empty() {
        reasons.push(Reason::NoItems);
    }

    reasons.extend(
        items
            .iter()
            .filter(|item| !item.has_valid_range())
            .map(|item| Reason::InvalidTimeRange { item: item.id }),
    );

    reasons.extend(
        conflicting_pairs(&intervals(items))
            .into_iter()
            .map(|(first, second)| Reason::ConflictingItems { first, second }),
    );

    let readiness = Readiness::from_reasons(reasons);
    debug!(
        schedule = %schedule.id,
        ready = readiness.ready,
        reasons = readiness.reasons.len(),
        "evaluated readiness"
    );
    readiness
}
