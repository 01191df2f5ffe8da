//! Read-only projections built on top of the readiness evaluator.
//!
//! Neither projection stores readiness; both re-evaluate on every call.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::access::Actor;
use crate::error::{AgendaError, Result};
use crate::model::{sorted_for_display, Item, Schedule, ScheduleId};
use crate::readiness::{evaluate, Reason};

/// One row of the owner dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub id: ScheduleId,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub capacity: Option<u32>,
    pub item_count: usize,
    pub ready: bool,
    pub shared: bool,
    /// Shared earlier, but edits since then left it failing readiness.
    pub shared_but_unready: bool,
    pub share_path: Option<String>,
}

impl ScheduleSummary {
    pub fn of(schedule: &Schedule, items: &[Item]) -> Self {
        let ready = evaluate(schedule, items).ready;
        let shared = schedule.is_shared();
        Self {
            id: schedule.id,
            title: schedule.title.clone(),
            date: schedule.date,
            capacity: schedule.capacity,
            item_count: items.len(),
            ready,
            shared,
            shared_but_unready: shared && !ready,
            share_path: schedule.share().map(|share| share.token.share_path()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub schedules: Vec<ScheduleSummary>,
    pub total_count: usize,
}

/// Summarize every schedule the actor may manage, preserving input order.
pub fn dashboard(actor: &Actor, entries: &[(Schedule, Vec<Item>)]) -> Dashboard {
    let schedules: Vec<ScheduleSummary> = entries
        .iter()
        .filter(|(schedule, _)| actor.can_manage(schedule))
        .map(|(schedule, items)| ScheduleSummary::of(schedule, items))
        .collect();

    Dashboard {
        total_count: schedules.len(),
        schedules,
    }
}

/// What anyone holding the token gets to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicView {
    pub id: ScheduleId,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub capacity: Option<u32>,
    pub shared_at: DateTime<Utc>,
    pub items: Vec<Item>,
    pub item_count: usize,
    /// Current readiness failures. A shared schedule stays shared after edits
    /// break it; the view surfaces the problems instead of hiding them.
    pub warnings: Vec<Reason>,
}

/// Build the public view of a shared schedule.
///
/// Fails with [`AgendaError::NotFound`] when the schedule was never shared,
/// matching the response for an unknown token.
pub fn public_view(schedule: &Schedule, items: &[Item]) -> Result<PublicView> {
    let share = schedule
        .share()
        .ok_or_else(|| AgendaError::NotFound(format!("shared program {}", schedule.id)))?;

    Ok(PublicView {
        id: schedule.id,
        title: schedule.title.clone(),
        description: schedule.description.clone(),
        date: schedule.date,
        capacity: schedule.capacity,
        shared_at: share.shared_at,
        items: sorted_for_display(items),
        item_count: items.len(),
        warnings: evaluate(schedule, items).reasons,
    })
}
