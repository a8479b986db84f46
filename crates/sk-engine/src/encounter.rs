//! The encounter: roster management and the command surface.
//!
//! One `Encounter` owns the roster, the turn/round cursor, the combat log,
//! the undo stack, and the RNG. Every externally visible command validates
//! its input first, then pushes an undo snapshot, then mutates, then logs,
//! so a rejected command leaves both the state and the undo stack exactly
//! as they were.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use sk_core::{Combatant, CombatantId, Condition, Faction};

use crate::config::EncounterConfig;
use crate::death::{self, SaveOutcome};
use crate::dice;
use crate::error::{TrackerError, TrackerResult};
use crate::log::CombatLog;
use crate::order;
use crate::save::{self, SaveData};
use crate::undo::{Snapshot, UndoStack};

/// What a successful load reconstructed.
#[derive(Debug, Clone, Copy)]
pub struct LoadOutcome {
    /// Combatants successfully loaded.
    pub loaded: usize,
    /// Malformed records dropped with a warning.
    pub skipped: usize,
}

/// A combat encounter in progress.
pub struct Encounter {
    config: EncounterConfig,
    roster: Vec<Combatant>,
    round: u32,
    current_turn: Option<CombatantId>,
    selected: Option<CombatantId>,
    next_id: u32,
    log: CombatLog,
    undo: UndoStack,
    rng: StdRng,
}

impl Encounter {
    /// Create an empty encounter at round 1.
    pub fn new(config: EncounterConfig) -> Self {
        let undo = UndoStack::new(config.undo_depth);
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            roster: Vec::new(),
            round: 1,
            current_turn: None,
            selected: None,
            next_id: 1,
            log: CombatLog::new(),
            undo,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The roster in turn order.
    pub fn roster(&self) -> &[Combatant] {
        &self.roster
    }

    /// Number of combatants.
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Current round (1-based).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Whose turn it is, if anyone's.
    pub fn current_turn(&self) -> Option<CombatantId> {
        self.current_turn
    }

    /// The selected combatant's id, if any.
    pub fn selected(&self) -> Option<CombatantId> {
        self.selected
    }

    /// The selected combatant, if any.
    pub fn selected_combatant(&self) -> Option<&Combatant> {
        self.selected
            .and_then(|id| order::position_of(&self.roster, id))
            .map(|idx| &self.roster[idx])
    }

    /// The combat log.
    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// The configuration this encounter was created with.
    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Roster commands
    // -----------------------------------------------------------------------

    /// Add a combatant at full HP with no conditions. The newcomer is
    /// selected; the first combatant added also takes the current turn.
    pub fn add(
        &mut self,
        name: &str,
        faction: Faction,
        initiative: i32,
        dexterity: i32,
        max_hp: i32,
    ) -> TrackerResult<CombatantId> {
        let name = self.validate_name(name)?;
        if max_hp < 1 {
            return Err(TrackerError::InvalidValue(
                "max HP must be at least 1".into(),
            ));
        }
        if self.roster.len() >= self.config.max_combatants {
            return Err(TrackerError::RosterFull {
                max: self.config.max_combatants,
            });
        }

        self.snapshot();
        let id = self.allocate_id();
        self.roster.push(Combatant::new(
            id,
            name.as_str(),
            faction,
            initiative,
            dexterity,
            max_hp,
        ));
        order::sort_roster(&mut self.roster);
        self.selected = Some(id);
        if self.roster.len() == 1 {
            self.current_turn = Some(id);
        }
        self.record(format!("Added {name}: Init {initiative}, HP {max_hp}."));
        Ok(id)
    }

    /// Remove the selected combatant. The current turn passes to the next
    /// survivor; emptying the roster resets the round to 1.
    pub fn remove_selected(&mut self) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;

        self.snapshot();
        let name = self.roster[idx].name.clone();
        self.record(format!("Removed {name}."));

        if self.current_turn == Some(id) {
            self.current_turn = if self.roster.len() > 1 {
                Some(self.roster[(idx + 1) % self.roster.len()].id)
            } else {
                None
            };
        }
        self.roster.remove(idx);

        if self.roster.is_empty() {
            self.selected = None;
            self.current_turn = None;
            self.round = 1;
        } else {
            let idx = idx.min(self.roster.len() - 1);
            self.selected = Some(self.roster[idx].id);
        }
        Ok(())
    }

    /// Duplicate the selected combatant `copies` times.
    ///
    /// Copies share the stat block but roll fresh initiative (d20 + dex)
    /// and start at full HP with no conditions or death-save state. Names
    /// get sequential numeric suffixes above the highest already used for
    /// the base name; an unsuffixed original is renamed into the sequence.
    pub fn duplicate_selected(&mut self, copies: u32) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;
        if copies == 0 {
            return Err(TrackerError::InvalidValue(
                "copy count must be at least 1".into(),
            ));
        }
        if self.roster.len() + copies as usize > self.config.max_combatants {
            return Err(TrackerError::RosterFull {
                max: self.config.max_combatants,
            });
        }

        let original = self.roster[idx].clone();
        let (base, own_suffix) = split_name_suffix(&original.name);
        let base = base.to_string();
        let mut highest = self
            .roster
            .iter()
            .filter(|c| c.id != id)
            .filter_map(|c| {
                let (other_base, suffix) = split_name_suffix(&c.name);
                (other_base == base).then_some(suffix).flatten()
            })
            .max()
            .unwrap_or(0);

        // Plan every name up front so a too-long result aborts cleanly.
        let rename = match own_suffix {
            None => {
                highest += 1;
                Some(format!("{base} {highest}"))
            }
            Some(suffix) => {
                highest = highest.max(suffix);
                None
            }
        };
        let copy_names: Vec<String> = (1..=u64::from(copies))
            .map(|k| format!("{base} {}", u64::from(highest) + k))
            .collect();
        for planned in rename.iter().chain(copy_names.iter()) {
            if planned.chars().count() > self.config.max_name_len {
                return Err(TrackerError::InvalidName(format!(
                    "{planned} exceeds {} characters",
                    self.config.max_name_len
                )));
            }
        }

        self.snapshot();
        let source_name = match rename {
            Some(new_name) => {
                let old = std::mem::replace(&mut self.roster[idx].name, new_name.clone());
                self.record(format!("Renamed {old} to {new_name}."));
                new_name
            }
            None => original.name.clone(),
        };
        for name in copy_names {
            let initiative = dice::initiative_roll(&mut self.rng, original.dexterity);
            let copy_id = self.allocate_id();
            self.roster.push(Combatant::new(
                copy_id,
                name.as_str(),
                original.faction,
                initiative,
                original.dexterity,
                original.max_hp,
            ));
            self.record(format!(
                "Duplicated {source_name} as {name} (Init {initiative})."
            ));
        }
        order::sort_roster(&mut self.roster);
        Ok(())
    }

    /// Move the selection up or down the roster, wrapping at the ends.
    /// Cosmetic: no undo snapshot and no log entry.
    pub fn move_selection(&mut self, direction: i32) {
        if self.roster.is_empty() {
            return;
        }
        let len = self.roster.len() as i32;
        let new_idx = match self
            .selected
            .and_then(|id| order::position_of(&self.roster, id))
        {
            None => 0,
            Some(i) => (i as i32 + direction).rem_euclid(len) as usize,
        };
        self.selected = Some(self.roster[new_idx].id);
    }

    // -----------------------------------------------------------------------
    // Stat commands
    // -----------------------------------------------------------------------

    /// Apply a signed HP delta to the selected combatant, routing through
    /// the death-save machinery. `critical` marks a critical hit, which
    /// counts double against a player who is already down.
    pub fn edit_hp(&mut self, delta: i32, critical: bool) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;
        if delta == 0 {
            return Err(TrackerError::InvalidValue(
                "HP change must be non-zero".into(),
            ));
        }
        {
            let c = &self.roster[idx];
            // A dead player is terminal; a dead enemy can still be healed.
            if c.dead && (c.faction == Faction::Player || delta < 0) {
                return Err(TrackerError::Dead {
                    name: c.name.clone(),
                });
            }
        }

        self.snapshot();
        if delta < 0 {
            self.apply_damage(idx, delta.saturating_neg(), critical);
        } else {
            self.apply_healing(idx, delta);
        }
        Ok(())
    }

    /// Set a new initiative for the selected combatant and re-sort.
    pub fn reroll_initiative(&mut self, value: i32) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;

        self.snapshot();
        let old = self.roster[idx].initiative;
        self.roster[idx].initiative = value;
        let name = self.roster[idx].name.clone();
        order::sort_roster(&mut self.roster);
        self.record(format!("{name} rerolled initiative from {old} to {value}."));
        Ok(())
    }

    /// Flip a condition on the selected combatant by registry index.
    /// Returns whether the condition is now active.
    ///
    /// Does not push an undo snapshot: the condition view calls
    /// [`Encounter::mark_undo_point`] once when it opens, so the whole menu
    /// session reverts as one step.
    pub fn toggle_condition(&mut self, index: usize) -> TrackerResult<bool> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;
        let condition = condition_at(index)?;

        let c = &mut self.roster[idx];
        let name = c.name.clone();
        let active = c.toggle_condition(condition);
        if active {
            self.record(format!("{name}: {condition} applied."));
        } else {
            self.record(format!("{name}: {condition} removed."));
        }
        Ok(active)
    }

    /// Set the remaining rounds on an active condition of the selected
    /// combatant. Rejected if the condition is not enabled.
    pub fn set_condition_duration(&mut self, index: usize, rounds: u32) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;
        let condition = condition_at(index)?;

        let c = &mut self.roster[idx];
        let name = c.name.clone();
        c.set_duration(condition, rounds)?;
        self.record(format!("{name}: {condition} duration set to {rounds}."));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Turn cycle
    // -----------------------------------------------------------------------

    /// Advance the turn cursor. Wrapping past the last combatant starts a
    /// new round: durations tick down (expiries logged) and the round
    /// banner is written. A dying player entering their turn automatically
    /// rolls a death save. No-op on an empty roster.
    pub fn next_turn(&mut self) -> TrackerResult<()> {
        if self.roster.is_empty() {
            return Ok(());
        }
        self.snapshot();

        let next_idx = match self
            .current_turn
            .and_then(|id| order::position_of(&self.roster, id))
        {
            Some(i) if i + 1 < self.roster.len() => i + 1,
            Some(_) => {
                self.start_new_round();
                0
            }
            None => 0,
        };

        let id = self.roster[next_idx].id;
        self.current_turn = Some(id);
        self.selected = Some(id);
        let name = self.roster[next_idx].name.clone();
        self.record(format!("{name}'s turn."));

        if self.roster[next_idx].is_dying() {
            self.roll_death_save(next_idx);
        }
        Ok(())
    }

    /// Step the turn cursor backward. Wrapping before the first combatant
    /// decrements the round, but never below 1. No automatic death save:
    /// stepping back is a correction, not a new turn entry.
    pub fn prev_turn(&mut self) -> TrackerResult<()> {
        if self.roster.is_empty() {
            return Ok(());
        }
        self.snapshot();

        let prev_idx = match self
            .current_turn
            .and_then(|id| order::position_of(&self.roster, id))
        {
            None => 0,
            Some(0) => {
                if self.round > 1 {
                    self.round -= 1;
                    let round = self.round;
                    self.record(format!("--- END OF ROUND {round} (Revert) ---"));
                }
                self.roster.len() - 1
            }
            Some(i) => i - 1,
        };

        let id = self.roster[prev_idx].id;
        self.current_turn = Some(id);
        self.selected = Some(id);
        let name = self.roster[prev_idx].name.clone();
        self.record(format!("Turn reverted to {name}."));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Death saves
    // -----------------------------------------------------------------------

    /// Roll a death save for the selected combatant outside their turn.
    pub fn manual_death_save(&mut self) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;
        {
            let c = &self.roster[idx];
            if c.dead {
                return Err(TrackerError::Dead {
                    name: c.name.clone(),
                });
            }
            if !c.is_dying() {
                return Err(TrackerError::NotDying {
                    name: c.name.clone(),
                });
            }
        }
        self.snapshot();
        self.roll_death_save(idx);
        Ok(())
    }

    /// Stabilize the selected dying player without healing them.
    pub fn stabilize_selected(&mut self) -> TrackerResult<()> {
        let id = self.selected_id()?;
        let idx = self.index_of(id)?;
        {
            let c = &self.roster[idx];
            if c.dead {
                return Err(TrackerError::Dead {
                    name: c.name.clone(),
                });
            }
            if c.stable {
                return Err(TrackerError::AlreadyStable {
                    name: c.name.clone(),
                });
            }
            if !c.is_dying() {
                return Err(TrackerError::NotDying {
                    name: c.name.clone(),
                });
            }
        }
        self.snapshot();
        death::stabilize(&mut self.roster[idx]);
        let name = self.roster[idx].name.clone();
        self.record(format!("{name} is stabilized."));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Push an undo snapshot outside the normal command flow. The condition
    /// view uses this once per menu session.
    pub fn mark_undo_point(&mut self) {
        self.snapshot();
    }

    /// Revert to the most recent snapshot. The combat log is not part of a
    /// snapshot and keeps its entries. Undo is not itself undoable.
    pub fn undo(&mut self) -> TrackerResult<()> {
        let snap = self.undo.pop().ok_or(TrackerError::NothingToUndo)?;
        self.roster = snap.roster;
        self.round = snap.round;
        self.current_turn = snap.current_turn;
        self.selected = snap.selected;
        let round = self.round;
        self.record(format!("Action UNDONE. Reverted to start of Round {round}."));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the full state to `path`. Engine state is unchanged either way.
    pub fn save(&self, path: &Path) -> TrackerResult<()> {
        let data = SaveData {
            round: self.round,
            next_id: self.next_id,
            current_turn: self.current_turn,
            selected: self.selected,
            roster: self.roster.clone(),
        };
        save::write_save(path, &data)
    }

    /// Replace the state with the contents of a save file.
    ///
    /// In-memory state is untouched on any failure. On success the log and
    /// undo stack are cleared (snapshots refer to the abandoned session).
    pub fn load(&mut self, path: &Path) -> TrackerResult<LoadOutcome> {
        let result = save::read_save(path, self.config.max_combatants)?;

        self.roster = result.data.roster;
        order::sort_roster(&mut self.roster);
        self.round = result.data.round;
        self.current_turn = result.data.current_turn;
        self.selected = result.data.selected;
        self.next_id = result.data.next_id;
        self.undo.clear();
        self.log.clear();

        let round = self.round;
        self.record(format!("Game Loaded from save file. Round set to {round}."));
        if result.skipped > 0 {
            self.record(format!(
                "Skipped {} corrupt combatant record(s).",
                result.skipped
            ));
        }
        Ok(LoadOutcome {
            loaded: self.roster.len(),
            skipped: result.skipped,
        })
    }

    /// Append the combat log to the export file, then clear it. Rejected
    /// when the log is empty; the log is kept intact if the write fails.
    pub fn export_log(&mut self, path: &Path) -> TrackerResult<()> {
        if self.log.is_empty() {
            return Err(TrackerError::EmptyLog);
        }
        self.log.export_to(path)?;
        self.log.clear();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn snapshot(&mut self) {
        self.undo.push(Snapshot {
            roster: self.roster.clone(),
            round: self.round,
            current_turn: self.current_turn,
            selected: self.selected,
        });
    }

    fn record(&mut self, message: impl Into<String>) {
        self.log.record(self.round, self.current_turn, message);
    }

    fn selected_id(&self) -> TrackerResult<CombatantId> {
        self.selected.ok_or(TrackerError::NoSelection)
    }

    fn index_of(&self, id: CombatantId) -> TrackerResult<usize> {
        order::position_of(&self.roster, id).ok_or(TrackerError::NotFound(id))
    }

    /// Assign the next free id. Wraps to 1 after exhausting `u32`, skipping
    /// any id still held by a live combatant.
    fn allocate_id(&mut self) -> CombatantId {
        loop {
            let id = CombatantId::new(self.next_id);
            self.next_id = self.next_id.checked_add(1).unwrap_or(1);
            if self.roster.iter().all(|c| c.id != id) {
                return id;
            }
        }
    }

    fn validate_name(&self, raw: &str) -> TrackerResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidName("name is empty".into()));
        }
        if name.chars().count() > self.config.max_name_len {
            return Err(TrackerError::InvalidName(format!(
                "name longer than {} characters",
                self.config.max_name_len
            )));
        }
        if name.contains('|') {
            return Err(TrackerError::InvalidName(
                "'|' is not allowed in names".into(),
            ));
        }
        Ok(name.to_string())
    }

    fn start_new_round(&mut self) {
        self.round += 1;
        let mut expirations: Vec<(String, Condition)> = Vec::new();
        for c in &mut self.roster {
            for condition in c.decrement_durations() {
                expirations.push((c.name.clone(), condition));
            }
        }
        for (name, condition) in expirations {
            self.record(format!("{name}: {condition} duration ended."));
        }
        let round = self.round;
        self.record(format!("--- START OF ROUND {round} ---"));
    }

    fn roll_death_save(&mut self, idx: usize) {
        let roll = dice::d20(&mut self.rng);
        let name = self.roster[idx].name.clone();
        let outcome = death::apply_save_roll(&mut self.roster[idx], roll);
        self.record(format!("{name} rolls a death save: {roll}."));
        self.log_save_outcome(&name, outcome);
    }

    fn log_save_outcome(&mut self, name: &str, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Revived => {
                self.record(format!("{name} is back on their feet with 1 HP!"));
            }
            SaveOutcome::Success {
                successes,
                stabilized,
            } => {
                self.record(format!("{name} succeeds a death save ({successes}/3)."));
                if stabilized {
                    self.record(format!("{name} is stable."));
                }
            }
            SaveOutcome::Failure {
                failures,
                died,
                broke_stable,
            } => {
                if broke_stable {
                    self.record(format!("{name} is no longer stable!"));
                }
                self.record(format!("{name} fails a death save ({failures}/3)."));
                if died {
                    self.record(format!("{name} has died."));
                }
            }
        }
    }

    fn apply_damage(&mut self, idx: usize, amount: i32, critical: bool) {
        let (name, old_hp, max_hp, faction) = {
            let c = &self.roster[idx];
            (c.name.clone(), c.hp, c.max_hp, c.faction)
        };

        if old_hp == 0 {
            // Only a dying or stable player reaches this point.
            let outcome = death::damage_while_down(&mut self.roster[idx], critical);
            self.record(format!("{name} took {amount} damage while down."));
            self.log_save_outcome(&name, outcome);
            return;
        }

        let instant =
            faction == Faction::Player && death::is_instant_death(old_hp, amount, max_hp);
        let new_hp = self.roster[idx].adjust_hp(-amount);
        self.record(format!("{name} took {amount} damage ({new_hp}/{max_hp})."));
        if new_hp > 0 {
            return;
        }

        if instant {
            death::kill(&mut self.roster[idx]);
            self.record(format!("{name} took massive damage and died instantly."));
        } else if faction == Faction::Player {
            let c = &mut self.roster[idx];
            c.conditions.insert(Condition::Unconscious);
            c.reset_death_saves();
            self.record(format!("{name} is UNCONSCIOUS and dying."));
        } else {
            self.roster[idx].dead = true;
            self.record(format!("{name} is slain."));
        }
    }

    fn apply_healing(&mut self, idx: usize, amount: i32) {
        let (name, old_hp, max_hp) = {
            let c = &self.roster[idx];
            (c.name.clone(), c.hp, c.max_hp)
        };
        let new_hp = self.roster[idx].adjust_hp(amount);
        self.record(format!("{name} healed {amount} HP ({new_hp}/{max_hp})."));

        if old_hp == 0 && new_hp > 0 {
            let c = &mut self.roster[idx];
            c.remove_condition(Condition::Unconscious);
            c.reset_death_saves();
            // Reachable for enemies only; healing a dead player was rejected.
            c.dead = false;
            self.record(format!("{name} is back on their feet."));
        }
    }
}

/// Split a trailing numeric suffix off a name: `"Goblin 3"` becomes
/// `("Goblin", Some(3))`, `"Goblin"` stays `("Goblin", None)`.
fn split_name_suffix(name: &str) -> (&str, Option<u32>) {
    if let Some((base, suffix)) = name.rsplit_once(' ')
        && !base.is_empty()
        && !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_digit())
        && let Ok(n) = suffix.parse::<u32>()
    {
        (base, Some(n))
    } else {
        (name, None)
    }
}

fn condition_at(index: usize) -> TrackerResult<Condition> {
    Condition::from_index(index)
        .ok_or_else(|| TrackerError::InvalidValue(format!("no condition at index {index}")))
}
