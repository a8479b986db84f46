//! The condition registry and per-combatant condition sets.
//!
//! The fifteen 5e-style conditions live in one enum so display names and
//! bit positions can never drift apart. A [`ConditionSet`] packs membership
//! into a `u16`, which is also the bitmask the save format stores.

use serde::{Deserialize, Serialize};

/// A named status effect that can be applied to a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Cannot see; attack rolls against it have advantage.
    Blinded,
    /// Cannot attack the charmer.
    Charmed,
    /// Cannot hear.
    Deafened,
    /// Disadvantage while the source of fear is in sight.
    Frightened,
    /// Speed is zero while grappled.
    Grappled,
    /// Cannot take actions or reactions.
    Incapacitated,
    /// Disadvantage on attack rolls and ability checks.
    Poisoned,
    /// Prone on the ground.
    Prone,
    /// Speed zero, attacks against it have advantage.
    Restrained,
    /// Incapacitated and unable to move or speak.
    Stunned,
    /// Cannot be seen without magical aid.
    Invisible,
    /// Incapacitated, fails Strength and Dexterity saves.
    Paralyzed,
    /// Turned to stone.
    Petrified,
    /// Unaware of surroundings; dropped by players at 0 HP.
    Unconscious,
    /// Cumulative exhaustion levels (tracked as a single flag here).
    Exhaustion,
}

impl Condition {
    /// Number of conditions in the registry.
    pub const COUNT: usize = 15;

    /// All conditions in registry (bit) order.
    pub const ALL: [Condition; Condition::COUNT] = [
        Condition::Blinded,
        Condition::Charmed,
        Condition::Deafened,
        Condition::Frightened,
        Condition::Grappled,
        Condition::Incapacitated,
        Condition::Poisoned,
        Condition::Prone,
        Condition::Restrained,
        Condition::Stunned,
        Condition::Invisible,
        Condition::Paralyzed,
        Condition::Petrified,
        Condition::Unconscious,
        Condition::Exhaustion,
    ];

    /// Position of this condition in the registry (0-based).
    pub fn index(self) -> usize {
        self as usize
    }

    /// The bitmask bit for this condition.
    pub fn bit(self) -> u16 {
        1 << self.index()
    }

    /// Look up a condition by registry index.
    pub fn from_index(index: usize) -> Option<Condition> {
        Condition::ALL.get(index).copied()
    }

    /// Display name of the condition.
    pub fn name(self) -> &'static str {
        match self {
            Condition::Blinded => "Blinded",
            Condition::Charmed => "Charmed",
            Condition::Deafened => "Deafened",
            Condition::Frightened => "Frightened",
            Condition::Grappled => "Grappled",
            Condition::Incapacitated => "Incapacitated",
            Condition::Poisoned => "Poisoned",
            Condition::Prone => "Prone",
            Condition::Restrained => "Restrained",
            Condition::Stunned => "Stunned",
            Condition::Invisible => "Invisible",
            Condition::Paralyzed => "Paralyzed",
            Condition::Petrified => "Petrified",
            Condition::Unconscious => "Unconscious",
            Condition::Exhaustion => "Exhaustion",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mask covering the fifteen valid condition bits.
const VALID_BITS: u16 = (1 << Condition::COUNT as u16) - 1;

/// A set of conditions, packed into a `u16` bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionSet(u16);

impl ConditionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a raw bitmask. Bits outside the registry are dropped.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & VALID_BITS)
    }

    /// The raw bitmask, as stored in the save format.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Returns true if the condition is in the set.
    pub fn contains(self, condition: Condition) -> bool {
        self.0 & condition.bit() != 0
    }

    /// Add a condition to the set.
    pub fn insert(&mut self, condition: Condition) {
        self.0 |= condition.bit();
    }

    /// Remove a condition from the set.
    pub fn remove(&mut self, condition: Condition) {
        self.0 &= !condition.bit();
    }

    /// Flip a condition's membership. Returns true if it is now active.
    pub fn toggle(&mut self, condition: Condition) -> bool {
        self.0 ^= condition.bit();
        self.contains(condition)
    }

    /// Returns true if no conditions are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of active conditions.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over active conditions in registry order.
    pub fn iter(self) -> impl Iterator<Item = Condition> {
        Condition::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}
