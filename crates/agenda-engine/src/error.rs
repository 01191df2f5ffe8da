//! Error types for agenda-engine operations.

use thiserror::Error;

use crate::model::ItemId;
use crate::readiness::Reason;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    #[error("Invalid time range: end must be after start")]
    InvalidTimeRange,

    #[error("Time conflict with item(s) {}", join(.conflicts))]
    ConflictDetected { conflicts: Vec<ItemId> },

    #[error("Schedule is not ready to be shared: {}", join(.reasons))]
    NotReady { reasons: Vec<Reason> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Share token is already bound to another schedule")]
    TokenCollision,

    #[error("Entropy source failed: {0}")]
    Entropy(String),

    #[error("Share store error: {0}")]
    Store(String),
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, AgendaError>;
