//! Explicit capability check for the boundary layer.
//!
//! The engine itself never consults identity. Callers that manage schedules
//! on behalf of a user pass an [`Actor`] in and filter with it.

use serde::{Deserialize, Serialize};

use crate::model::{Schedule, UserId};

/// The user on whose behalf a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user: UserId,
    #[serde(default)]
    pub is_admin: bool,
}

impl Actor {
    pub fn user(user: UserId) -> Self {
        Self { user, is_admin: false }
    }

    pub fn admin(user: UserId) -> Self {
        Self { user, is_admin: true }
    }

    /// Owners manage their own schedules; admins manage all of them.
    pub fn can_manage(&self, schedule: &Schedule) -> bool {
        self.is_admin || schedule.owner == self.user
    }
}
