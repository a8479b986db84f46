//! The dying state machine for player combatants.
//!
//! A player whose HP drops to 0 starts rolling death saving throws. Three
//! sources feed the same success/failure counters: the automatic roll at
//! the start of their turn, a manual roll, and damage taken while down.
//! All three funnel through [`add_successes`]/[`add_failures`] so the
//! terminal transitions (stable at 3 successes, dead at 3 failures) are
//! checked in exactly one place.

use sk_core::{Combatant, Condition};

/// What a death-save event did to the combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Natural 20: back on their feet at 1 HP, dying state cleared.
    Revived,
    /// The roll added successes.
    Success {
        /// Success count after the roll.
        successes: u8,
        /// Reached 3 successes and is now stable.
        stabilized: bool,
    },
    /// The roll or damage added failures.
    Failure {
        /// Failure count after the event.
        failures: u8,
        /// Reached 3 failures and is now dead.
        died: bool,
        /// The event knocked them out of a stable state.
        broke_stable: bool,
    },
}

/// Resolve a d20 death saving throw for a dying player.
///
/// 20 revives at 1 HP; 1 counts two failures; 10-19 one success; 2-9 one
/// failure. The caller is responsible for ensuring the target
/// [`Combatant::is_dying`].
pub fn apply_save_roll(combatant: &mut Combatant, roll: u8) -> SaveOutcome {
    match roll {
        20 => {
            combatant.hp = 1;
            combatant.remove_condition(Condition::Unconscious);
            combatant.reset_death_saves();
            SaveOutcome::Revived
        }
        1 => add_failures(combatant, 2, false),
        10..=19 => add_successes(combatant, 1),
        _ => add_failures(combatant, 1, false),
    }
}

/// Apply damage taken at 0 HP: one failure, two if the hit was critical.
/// Breaks a stable state first, re-entering the dying state.
pub fn damage_while_down(combatant: &mut Combatant, critical: bool) -> SaveOutcome {
    let broke_stable = combatant.stable;
    combatant.stable = false;
    add_failures(combatant, if critical { 2 } else { 1 }, broke_stable)
}

/// True when a single damage event kills outright: the target had HP left
/// and the excess beyond what reduced them to 0 is at least their maximum.
pub fn is_instant_death(hp_before: i32, damage: i32, max_hp: i32) -> bool {
    hp_before > 0 && damage - hp_before >= max_hp
}

/// Kill a combatant outright, skipping the dying state.
pub fn kill(combatant: &mut Combatant) {
    combatant.hp = 0;
    combatant.reset_death_saves();
    combatant.dead = true;
    combatant.conditions.insert(Condition::Unconscious);
}

/// Stabilize a dying player: counters reset, no further saves until damaged.
pub fn stabilize(combatant: &mut Combatant) {
    combatant.reset_death_saves();
    combatant.stable = true;
}

fn add_successes(combatant: &mut Combatant, n: u8) -> SaveOutcome {
    let successes = (combatant.save_successes + n).min(3);
    combatant.save_successes = successes;
    let stabilized = successes >= 3;
    if stabilized {
        stabilize(combatant);
    }
    SaveOutcome::Success {
        successes,
        stabilized,
    }
}

fn add_failures(combatant: &mut Combatant, n: u8, broke_stable: bool) -> SaveOutcome {
    let failures = (combatant.save_failures + n).min(3);
    combatant.save_failures = failures;
    let died = failures >= 3;
    if died {
        combatant.stable = false;
        combatant.dead = true;
    }
    SaveOutcome::Failure {
        failures,
        died,
        broke_stable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_core::{CombatantId, Faction};

    fn downed_player() -> Combatant {
        let mut c = Combatant::new(CombatantId::new(1), "Aria", Faction::Player, 15, 2, 20);
        c.adjust_hp(-20);
        c.conditions.insert(Condition::Unconscious);
        c
    }

    #[test]
    fn three_failures_is_death() {
        let mut c = downed_player();
        apply_save_roll(&mut c, 5);
        apply_save_roll(&mut c, 9);
        let outcome = apply_save_roll(&mut c, 2);
        assert_eq!(
            outcome,
            SaveOutcome::Failure {
                failures: 3,
                died: true,
                broke_stable: false
            }
        );
        assert!(c.dead);
        assert!(!c.stable);
    }

    #[test]
    fn three_successes_is_stable() {
        let mut c = downed_player();
        apply_save_roll(&mut c, 12);
        apply_save_roll(&mut c, 19);
        let outcome = apply_save_roll(&mut c, 10);
        assert_eq!(
            outcome,
            SaveOutcome::Success {
                successes: 3,
                stabilized: true
            }
        );
        assert!(c.stable);
        assert!(!c.dead);
        assert_eq!(c.save_failures, 0);
    }

    #[test]
    fn natural_one_counts_twice() {
        let mut c = downed_player();
        apply_save_roll(&mut c, 1);
        assert_eq!(c.save_failures, 2);
        let outcome = apply_save_roll(&mut c, 1);
        assert!(matches!(outcome, SaveOutcome::Failure { died: true, .. }));
    }

    #[test]
    fn natural_twenty_revives_regardless_of_counters() {
        let mut c = downed_player();
        c.save_successes = 2;
        c.save_failures = 2;
        let outcome = apply_save_roll(&mut c, 20);
        assert_eq!(outcome, SaveOutcome::Revived);
        assert_eq!(c.hp, 1);
        assert_eq!(c.save_successes, 0);
        assert_eq!(c.save_failures, 0);
        assert!(!c.conditions.contains(Condition::Unconscious));
        assert!(!c.is_dying());
    }

    #[test]
    fn critical_damage_while_down_counts_twice() {
        let mut c = downed_player();
        damage_while_down(&mut c, true);
        assert_eq!(c.save_failures, 2);
        let outcome = damage_while_down(&mut c, true);
        assert!(matches!(
            outcome,
            SaveOutcome::Failure {
                failures: 3,
                died: true,
                ..
            }
        ));
    }

    #[test]
    fn damage_breaks_stable() {
        let mut c = downed_player();
        stabilize(&mut c);
        assert!(c.stable);
        let outcome = damage_while_down(&mut c, false);
        assert_eq!(
            outcome,
            SaveOutcome::Failure {
                failures: 1,
                died: false,
                broke_stable: true
            }
        );
        assert!(!c.stable);
        assert!(c.is_dying());
    }

    #[test]
    fn stabilize_resets_counters() {
        let mut c = downed_player();
        c.save_successes = 1;
        c.save_failures = 2;
        stabilize(&mut c);
        assert!(c.stable);
        assert_eq!(c.save_successes, 0);
        assert_eq!(c.save_failures, 0);
    }

    #[test]
    fn instant_death_threshold() {
        // 20 max HP, at 5 HP: 25 damage leaves exactly 20 excess.
        assert!(is_instant_death(5, 25, 20));
        assert!(!is_instant_death(5, 24, 20));
        // Already at 0: never instant death, handled as damage while down.
        assert!(!is_instant_death(0, 100, 20));
    }

    #[test]
    fn kill_skips_dying() {
        let mut c = Combatant::new(CombatantId::new(2), "Bea", Faction::Player, 10, 1, 10);
        c.hp = 4;
        kill(&mut c);
        assert!(c.dead);
        assert_eq!(c.hp, 0);
        assert!(c.conditions.contains(Condition::Unconscious));
        assert!(!c.is_dying());
    }
}
