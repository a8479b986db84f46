//! Core types for Skirmish: combatants, factions, and conditions.
//!
//! This crate holds the data model shared by the combat engine and the
//! terminal frontend. It has no opinion about turn order, undo, or
//! persistence; those live in `sk-engine`.

pub mod combatant;
pub mod condition;
pub mod error;

pub use combatant::{Combatant, CombatantId, Faction};
pub use condition::{Condition, ConditionSet};
pub use error::{CoreError, CoreResult};
