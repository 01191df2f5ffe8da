//! One-way share lifecycle: `Unshared` → `Shared`.
//!
//! A schedule is shared at most once. The first successful share mints an
//! unguessable token and records the instant; every later call returns that
//! same pair. There is no reverse transition. Deleting the schedule is the
//! only way to revoke public visibility, which is the caller's concern.
//!
//! Two concurrent share calls may both pass the readiness check. The store
//! settles the race with a single conditional write ("assign only if absent"),
//! and the loser adopts the winner's share instead of its own.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use base64::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AgendaError, Result};
use crate::model::{Item, Schedule, ScheduleId};
use crate::readiness::evaluate;

/// Random bytes per token. Encodes to 43 URL-safe characters.
pub const TOKEN_BYTES: usize = 32;

/// How many fresh tokens are tried when the store reports a collision.
pub const MAX_MINT_ATTEMPTS: usize = 4;

/// Public handle of a shared schedule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareToken(String);

impl ShareToken {
    /// Mint a token from the OS CSPRNG. Not derived from any id or clock.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; TOKEN_BYTES];
        getrandom::fill(&mut bytes).map_err(|e| AgendaError::Entropy(e.to_string()))?;
        Ok(Self(BASE64_URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Wrap a token received from outside, e.g. a public URL segment.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path under which the public view of this schedule is served.
    pub fn share_path(&self) -> String {
        format!("/api/programs/shared/{}/", self.0)
    }
}

impl std::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The token and first-share instant of a shared schedule. Immutable once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub token: ShareToken,
    pub shared_at: DateTime<Utc>,
}

/// Share state of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ShareState {
    #[default]
    Unshared,
    Shared(Share),
}

impl ShareState {
    pub fn share(&self) -> Option<&Share> {
        match self {
            ShareState::Unshared => None,
            ShareState::Shared(share) => Some(share),
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, ShareState::Shared(_))
    }
}

/// What a share request should do, decided without touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareDecision {
    /// Already shared; hand back the existing pair unchanged.
    Existing(Share),
    /// Ready and unshared; a new token must be minted.
    Mint,
}

/// Decide the outcome of a share request.
///
/// An already-shared schedule short-circuits before readiness is checked.
/// Otherwise a failing evaluation yields [`AgendaError::NotReady`] carrying
/// the full list of reasons.
pub fn prepare_share(schedule: &Schedule, items: &[Item]) -> Result<ShareDecision> {
    if let Some(share) = schedule.share() {
        return Ok(ShareDecision::Existing(share.clone()));
    }

    let readiness = evaluate(schedule, items);
    if !readiness.ready {
        return Err(AgendaError::NotReady {
            reasons: readiness.reasons,
        });
    }

    Ok(ShareDecision::Mint)
}

/// Conditional-write primitive backing token assignment.
///
/// The lifecycle asks [`ShareStore::existing`] before running readiness, so a
/// caller holding a stale unshared copy still gets the stored share back even
/// if its view of the items no longer passes.
pub trait ShareStore {
    /// The share currently bound to `schedule`, if any.
    fn existing(&self, schedule: ScheduleId) -> Result<Option<Share>>;

    /// Bind `share` to `schedule` only if the schedule has no share yet.
    ///
    /// Returns the share bound after the call: `share` itself when this call
    /// won, or the previously stored one when it lost. Fails with
    /// [`AgendaError::TokenCollision`] when the token already belongs to a
    /// different schedule.
    fn assign_if_absent(&self, schedule: ScheduleId, share: Share) -> Result<Share>;
}

#[derive(Debug, Default)]
struct Bindings {
    by_schedule: HashMap<ScheduleId, Share>,
    by_token: HashMap<ShareToken, ScheduleId>,
}

/// In-process share store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryShareStore {
    bindings: Mutex<Bindings>,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Bindings>> {
        self.bindings
            .lock()
            .map_err(|_| AgendaError::Store("share store lock poisoned".to_string()))
    }

    /// Resolve a public token to its schedule.
    pub fn resolve(&self, token: &ShareToken) -> Result<ScheduleId> {
        self.lock()?
            .by_token
            .get(token)
            .copied()
            .ok_or_else(|| AgendaError::NotFound(format!("share token '{}'", token)))
    }

    pub fn share_of(&self, schedule: ScheduleId) -> Result<Option<Share>> {
        Ok(self.lock()?.by_schedule.get(&schedule).cloned())
    }

    /// Drop the binding of a deleted schedule.
    pub fn forget(&self, schedule: ScheduleId) -> Result<Option<Share>> {
        let mut bindings = self.lock()?;
        let removed = bindings.by_schedule.remove(&schedule);
        if let Some(share) = &removed {
            bindings.by_token.remove(&share.token);
        }
        Ok(removed)
    }
}

impl ShareStore for MemoryShareStore {
    fn existing(&self, schedule: ScheduleId) -> Result<Option<Share>> {
        self.share_of(schedule)
    }

    fn assign_if_absent(&self, schedule: ScheduleId, share: Share) -> Result<Share> {
        let mut bindings = self.lock()?;

        if let Some(existing) = bindings.by_schedule.get(&schedule) {
            return Ok(existing.clone());
        }
        if bindings.by_token.contains_key(&share.token) {
            return Err(AgendaError::TokenCollision);
        }

        bindings.by_token.insert(share.token.clone(), schedule);
        bindings.by_schedule.insert(schedule, share.clone());
        Ok(share)
    }
}

/// Drives the share transition against a [`ShareStore`].
#[derive(Debug, Default)]
pub struct ShareLifecycle<S> {
    store: S,
}

impl<S: ShareStore> ShareLifecycle<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Share a schedule, stamping it with the current instant.
    pub fn share(&self, schedule: &mut Schedule, items: &[Item]) -> Result<Share> {
        self.share_at(schedule, items, Utc::now())
    }

    /// Share a schedule, stamping a newly minted share with `now`.
    ///
    /// Idempotent: a shared schedule gets its existing pair back and the store
    /// is not touched. An unshared copy adopts whatever the store already
    /// holds before readiness is checked. On success `schedule` carries the
    /// share.
    pub fn share_at(
        &self,
        schedule: &mut Schedule,
        items: &[Item],
        now: DateTime<Utc>,
    ) -> Result<Share> {
        if let Some(share) = schedule.share() {
            return Ok(share.clone());
        }
        if let Some(stored) = self.store.existing(schedule.id)? {
            debug!(schedule = %schedule.id, "adopting share already bound in store");
            schedule.record_share(stored.clone());
            return Ok(stored);
        }
        if let ShareDecision::Existing(share) = prepare_share(schedule, items)? {
            return Ok(share);
        }

        for attempt in 1..=MAX_MINT_ATTEMPTS {
            let candidate = Share {
                token: ShareToken::generate()?,
                shared_at: now,
            };

            match self.store.assign_if_absent(schedule.id, candidate.clone()) {
                Ok(stored) => {
                    if stored == candidate {
                        info!(schedule = %schedule.id, "schedule shared");
                    } else {
                        warn!(
                            schedule = %schedule.id,
                            "concurrent share won; adopting stored token"
                        );
                    }
                    schedule.record_share(stored.clone());
                    return Ok(stored);
                }
                Err(AgendaError::TokenCollision) => {
                    warn!(schedule = %schedule.id, attempt, "share token collision; minting again");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AgendaError::TokenCollision)
    }
}
