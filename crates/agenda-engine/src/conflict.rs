//! Detect overlapping items within a schedule.
//!
//! Two intervals overlap when `a.start < b.end && b.start < a.end`. Intervals
//! that share a start instant always conflict. Adjacent intervals (where one
//! ends exactly when another starts) are NOT conflicts.

use tracing::debug;

use crate::error::{AgendaError, Result};
use crate::model::{Interval, ItemId};

/// Whether two intervals conflict. Symmetric in its arguments.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    // Equal starts are listed on their own so a zero-length or inverted
    // interval still collides with a sibling starting at the same instant.
    a.start == b.start || (a.start < b.end && b.start < a.end)
}

/// Find every existing interval that conflicts with `candidate`.
///
/// When `exclude` is given (the update path), the interval carrying that id is
/// dropped from `existing` first, so an item never conflicts with its own
/// previous state. Returned ids are sorted and unique.
///
/// The caller guarantees `candidate.start < candidate.end`; see [`check_item`]
/// for the guarded variant.
pub fn find_conflicts(
    existing: &[Interval],
    candidate: &Interval,
    exclude: Option<ItemId>,
) -> Vec<ItemId> {
    let mut conflicts: Vec<ItemId> = existing
        .iter()
        .filter(|other| Some(other.id) != exclude)
        .filter(|other| overlaps(other, candidate))
        .map(|other| other.id)
        .collect();

    conflicts.sort_unstable();
    conflicts.dedup();
    conflicts
}

/// Validate a candidate item before it is written.
///
/// Fails with [`AgendaError::InvalidTimeRange`] when the end is not strictly
/// after the start, and with [`AgendaError::ConflictDetected`] naming every
/// conflicting sibling otherwise.
pub fn check_item(
    existing: &[Interval],
    candidate: &Interval,
    exclude: Option<ItemId>,
) -> Result<()> {
    if candidate.end <= candidate.start {
        return Err(AgendaError::InvalidTimeRange);
    }

    let conflicts = find_conflicts(existing, candidate, exclude);
    if conflicts.is_empty() {
        return Ok(());
    }

    debug!(item = %candidate.id, ?conflicts, "rejecting item mutation on time conflict");
    Err(AgendaError::ConflictDetected { conflicts })
}

/// Find all conflicting unordered pairs in a set of intervals.
///
/// Sorts by start and sweeps with an active set, so the cost is
/// `O(n log n + k)` for `k` reported pairs. Each pair is reported once as
/// `(lower id, higher id)`, and the list is sorted.
pub fn conflicting_pairs(intervals: &[Interval]) -> Vec<(ItemId, ItemId)> {
    let mut sorted: Vec<&Interval> = intervals.iter().collect();
    sorted.sort_by_key(|iv| (iv.start, iv.end, iv.id));

    let mut active: Vec<&Interval> = Vec::new();
    let mut pairs = Vec::new();

    for current in sorted {
        // Anything that ended by now and started strictly earlier can neither
        // overlap nor share a start with this or any later interval.
        active.retain(|open| !(open.end <= current.start && open.start < current.start));

        for open in &active {
            if open.id != current.id && overlaps(open, current) {
                pairs.push(ordered(open.id, current.id));
            }
        }
        active.push(current);
    }

    pairs.sort_unstable();
    pairs.dedup();
    pairs
}

fn ordered(a: ItemId, b: ItemId) -> (ItemId, ItemId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
