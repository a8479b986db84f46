//! Error types for the combat engine.

use std::path::PathBuf;

use sk_core::{CombatantId, CoreError};

/// Errors surfaced by engine operations.
///
/// Nothing here is fatal: every variant is reported to the user and leaves
/// engine state unchanged. Capacity on the undo stack is handled by policy
/// (evict oldest) and never appears as an error.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A name failed validation (empty, too long, or reserved characters).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A numeric input was out of range or otherwise unusable.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The referenced combatant is not in the roster.
    #[error("combatant not found: {0}")]
    NotFound(CombatantId),

    /// An operation needed a selection and none exists.
    #[error("no combatant selected")]
    NoSelection,

    /// The roster is at its participant cap.
    #[error("roster is full ({max} combatants max)")]
    RosterFull {
        /// The configured cap.
        max: usize,
    },

    /// The target is dead; only undo can bring them back.
    #[error("{name} is dead")]
    Dead {
        /// Name of the dead combatant.
        name: String,
    },

    /// A death-save operation targeted someone who is not dying.
    #[error("{name} is not dying")]
    NotDying {
        /// Name of the combatant.
        name: String,
    },

    /// Stabilize targeted someone already stable.
    #[error("{name} is already stable")]
    AlreadyStable {
        /// Name of the combatant.
        name: String,
    },

    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The combat log is empty; there is nothing to export.
    #[error("combat log is empty")]
    EmptyLog,

    /// A model-level rejection (e.g. duration on an inactive condition).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A file could not be opened, read, or written.
    #[error("cannot access {path}: {source}")]
    Io {
        /// The path the operation attempted.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The save file failed structural parsing; nothing was loaded.
    #[error("save file corrupt: {0}")]
    CorruptSave(String),
}

/// Convenience result type for engine operations.
pub type TrackerResult<T> = Result<T, TrackerError>;
