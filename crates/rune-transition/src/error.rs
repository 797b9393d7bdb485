//! Error types for transition controllers.

use thiserror::Error;

/// Result type for transition operations.
pub type Result<T> = std::result::Result<T, TransitionError>;

/// Errors surfaced by the transition controllers.
///
/// Missing stylesheet rules and interrupted phases are not errors; they
/// resolve as instant completions or skipped "after" hooks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A mode string other than `inout` or `outin`.
    #[error("invalid transition mode {0:?} (expected \"inout\" or \"outin\")")]
    InvalidMode(String),

    /// The same key appeared twice in one group commit.
    #[error("duplicate key in transition group commit: {0}")]
    DuplicateKey(String),

    /// The same element appeared under two keys in one group commit.
    #[error("element listed under more than one key in transition group commit: {0}")]
    DuplicateElement(String),
}
