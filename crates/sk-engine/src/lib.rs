//! Combat state engine for Skirmish.
//!
//! Owns the roster, the turn/round cycle, condition-duration bookkeeping,
//! the death-save state machine, the combat log, the undo stack, and the
//! save-file format. The terminal frontend in `sk-tui` drives this engine
//! and never mutates combat state directly.

pub mod config;
pub mod death;
pub mod dice;
pub mod encounter;
pub mod error;
pub mod log;
pub mod order;
pub mod save;
pub mod undo;

pub use config::EncounterConfig;
pub use death::SaveOutcome;
pub use encounter::{Encounter, LoadOutcome};
pub use error::{TrackerError, TrackerResult};
pub use log::{CombatLog, LogEntry};
