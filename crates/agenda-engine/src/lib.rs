//! # agenda-engine
//!
//! Validation core for event programs: a schedule of timed items that can be
//! published once it is structurally and temporally sound.
//!
//! The engine is pure logic. Storage, identity and transport belong to the
//! caller, which invokes the engine on every item mutation and share attempt.
//!
//! ## Modules
//!
//! - [`model`] — Schedules, items, intervals and their identifiers
//! - [`conflict`] — Detect overlapping items (per mutation and all-pairs)
//! - [`readiness`] — Derive whether a schedule may be shared, with every failing reason
//! - [`share`] — One-way `Unshared` → `Shared` transition and token minting
//! - [`overview`] — Dashboard summaries and the public shared view
//! - [`access`] — Explicit owner-or-admin capability check
//! - [`error`] — Error types

pub mod access;
pub mod conflict;
pub mod error;
pub mod model;
pub mod overview;
pub mod readiness;
pub mod share;

pub use access::Actor;
pub use conflict::{check_item, conflicting_pairs, find_conflicts, overlaps};
pub use error::AgendaError;
pub use model::{Interval, Item, ItemId, Schedule, ScheduleId, UserId};
pub use readiness::{evaluate, Readiness, Reason};
pub use share::{MemoryShareStore, Share, ShareLifecycle, ShareState, ShareStore, ShareToken};
