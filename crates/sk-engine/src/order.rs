//! Turn-order comparison and roster sorting.
//!
//! The ordering is total: initiative descending, dexterity descending, id
//! ascending. The id tiebreak makes the sort deterministic and stable
//! across repeated re-sorts, so equal stat blocks keep a fixed order.

use std::cmp::Ordering;

use sk_core::{Combatant, CombatantId};

/// Compare two combatants for turn order.
pub fn initiative_cmp(a: &Combatant, b: &Combatant) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then(b.dexterity.cmp(&a.dexterity))
        .then(a.id.get().cmp(&b.id.get()))
}

/// Re-establish turn order after an initiative-affecting change.
pub fn sort_roster(roster: &mut [Combatant]) {
    roster.sort_by(initiative_cmp);
}

/// Roster position of a combatant by id.
pub fn position_of(roster: &[Combatant], id: CombatantId) -> Option<usize> {
    roster.iter().position(|c| c.id == id)
}
