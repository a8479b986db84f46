//! Error types for the core model.

use crate::condition::Condition;

/// Errors that can occur when mutating a combatant.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A duration was set on a condition the combatant does not have.
    #[error("{0} must be enabled before setting a duration")]
    ConditionInactive(Condition),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
