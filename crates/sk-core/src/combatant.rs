//! The combatant model: identity, combat stats, HP, conditions, death saves.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, ConditionSet};
use crate::error::{CoreError, CoreResult};

/// Stable identifier for a combatant, unique for the life of the encounter.
///
/// Ids are assigned monotonically by the engine starting at 1 and are never
/// reused while the combatant is alive in the roster, so reordering the
/// roster never invalidates a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId(u32);

impl CombatantId {
    /// Wrap a raw id value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw id value, as stored in the save format.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side a combatant fights for. Determines 0-HP semantics: enemies
/// die outright, players enter the death-save state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    /// A player character.
    Player,
    /// An enemy or NPC opponent.
    Enemy,
}

impl Faction {
    /// Numeric code used by the save format (0 = player, 1 = enemy).
    pub fn code(self) -> u8 {
        match self {
            Faction::Player => 0,
            Faction::Enemy => 1,
        }
    }

    /// Parse a save-format faction code.
    pub fn from_code(code: u8) -> Option<Faction> {
        match code {
            0 => Some(Faction::Player),
            1 => Some(Faction::Enemy),
            _ => None,
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Player => write!(f, "Player"),
            Faction::Enemy => write!(f, "Enemy"),
        }
    }
}

/// One participant in the encounter.
///
/// HP is always within `0..=max_hp`; all mutation goes through
/// [`Combatant::adjust_hp`]. Condition durations are tracked per condition
/// and only meaningful while the condition is active (0 = indefinite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Stable identifier.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// Initiative score (higher acts first).
    pub initiative: i32,
    /// Dexterity score, the initiative tiebreaker.
    pub dexterity: i32,
    /// Hit point maximum, at least 1.
    pub max_hp: i32,
    /// Current hit points, clamped to `0..=max_hp`.
    pub hp: i32,
    /// Player or enemy.
    pub faction: Faction,
    /// Active conditions.
    pub conditions: ConditionSet,
    /// Remaining rounds per condition; 0 means indefinite.
    durations: [u32; Condition::COUNT],
    /// Death saving throw successes (0..=3).
    pub save_successes: u8,
    /// Death saving throw failures (0..=3).
    pub save_failures: u8,
    /// Stabilized at 0 HP; no longer rolling saves.
    pub stable: bool,
    /// Dead. Terminal for players.
    pub dead: bool,
}

impl Combatant {
    /// Create a combatant at full HP with no conditions.
    pub fn new(
        id: CombatantId,
        name: impl Into<String>,
        faction: Faction,
        initiative: i32,
        dexterity: i32,
        max_hp: i32,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            id,
            name: name.into(),
            initiative,
            dexterity,
            max_hp,
            hp: max_hp,
            faction,
            conditions: ConditionSet::new(),
            durations: [0; Condition::COUNT],
            save_successes: 0,
            save_failures: 0,
            stable: false,
            dead: false,
        }
    }

    /// Apply a signed HP delta, clamping to `0..=max_hp`. Returns the new HP.
    pub fn adjust_hp(&mut self, delta: i32) -> i32 {
        self.hp = self.hp.saturating_add(delta).clamp(0, self.max_hp);
        self.hp
    }

    /// Flip a condition. Turning a condition off resets its duration.
    /// Returns true if the condition is now active.
    pub fn toggle_condition(&mut self, condition: Condition) -> bool {
        let active = self.conditions.toggle(condition);
        if !active {
            self.durations[condition.index()] = 0;
        }
        active
    }

    /// Remove a condition and reset its duration.
    pub fn remove_condition(&mut self, condition: Condition) {
        self.conditions.remove(condition);
        self.durations[condition.index()] = 0;
    }

    /// Remaining rounds for a condition (0 = indefinite or inactive).
    pub fn duration(&self, condition: Condition) -> u32 {
        self.durations[condition.index()]
    }

    /// Set the remaining rounds for an active condition.
    ///
    /// Rejected if the condition is not currently applied.
    pub fn set_duration(&mut self, condition: Condition, rounds: u32) -> CoreResult<()> {
        if !self.conditions.contains(condition) {
            return Err(CoreError::ConditionInactive(condition));
        }
        self.durations[condition.index()] = rounds;
        Ok(())
    }

    /// Tick all timed conditions down one round. A condition whose duration
    /// reaches 0 is removed; the expired conditions are returned in registry
    /// order so the caller can log each.
    pub fn decrement_durations(&mut self) -> Vec<Condition> {
        let mut expired = Vec::new();
        for condition in Condition::ALL {
            let d = &mut self.durations[condition.index()];
            if *d > 0 {
                *d -= 1;
                if *d == 0 {
                    self.conditions.remove(condition);
                    expired.push(condition);
                }
            }
        }
        expired
    }

    /// True for a player at 0 HP who is still rolling death saves.
    pub fn is_dying(&self) -> bool {
        self.faction == Faction::Player && self.hp == 0 && !self.stable && !self.dead
    }

    /// Clear death-save counters and the stable flag, together.
    pub fn reset_death_saves(&mut self) {
        self.save_successes = 0;
        self.save_failures = 0;
        self.stable = false;
    }
}
