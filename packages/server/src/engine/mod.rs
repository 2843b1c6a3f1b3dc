//! Round & scoring engine.
//!
//! Every mutating operation here takes a [`Caller`] and states the capability
//! it needs as a [`Precondition`] before touching storage, so the rules hold
//! no matter which transport invokes them.

pub mod capability;
pub mod evaluation;
pub mod leaderboard;
pub mod readiness;
pub mod roster;
pub mod rounds;

use sea_orm::{DbErr, SqlErr};

pub use capability::{Caller, Precondition};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Role or relationship check failed.
    #[error("caller lacks the required capability")]
    Forbidden,
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("username is already taken")]
    UsernameTaken,
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("{0}")]
    Internal(String),
}

/// The driver message of a unique-constraint violation, if `err` is one.
pub(crate) fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => Some(msg),
        _ => None,
    }
}
