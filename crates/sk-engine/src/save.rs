//! The pipe-delimited save-file format.
//!
//! Line 1 is the header `round|nextId|count|currentTurnId|selectedId`
//! (`-1` for an unset id). Each following line is one combatant:
//! `id|name|faction|initiative|dex|maxHp|hp|bitmask|successes|failures|`
//! `stable|dead|dur_0|..|dur_14`. The trailing death-save and duration
//! columns are optional on load for files written before those features,
//! defaulting to 0.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use sk_core::{Combatant, CombatantId, ConditionSet, Faction};

use crate::error::{TrackerError, TrackerResult};

/// Everything the save file captures.
#[derive(Debug, Clone)]
pub struct SaveData {
    /// Round counter.
    pub round: u32,
    /// Next id to assign (recomputed on load).
    pub next_id: u32,
    /// Current-turn combatant, if any.
    pub current_turn: Option<CombatantId>,
    /// Selected combatant, if any.
    pub selected: Option<CombatantId>,
    /// The roster.
    pub roster: Vec<Combatant>,
}

/// A parsed save file plus how many malformed records were dropped.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// The reconstructed state.
    pub data: SaveData,
    /// Combatant records skipped as malformed.
    pub skipped: usize,
}

fn id_field(id: Option<CombatantId>) -> i64 {
    id.map_or(-1, |id| i64::from(id.get()))
}

/// Serialize and write the full state to `path`.
///
/// The whole file is built in memory and written in one call, so a failure
/// is reported without a partial file being mistaken for a successful save.
pub fn write_save(path: &Path, data: &SaveData) -> TrackerResult<()> {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}|{}|{}|{}|{}",
        data.round,
        data.next_id,
        data.roster.len(),
        id_field(data.current_turn),
        id_field(data.selected),
    );

    for c in &data.roster {
        let _ = write!(
            out,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            c.id.get(),
            c.name,
            c.faction.code(),
            c.initiative,
            c.dexterity,
            c.max_hp,
            c.hp,
            c.conditions.bits(),
            c.save_successes,
            c.save_failures,
            u8::from(c.stable),
            u8::from(c.dead),
        );
        for condition in sk_core::Condition::ALL {
            let _ = write!(out, "|{}", c.duration(condition));
        }
        out.push('\n');
    }

    fs::write(path, out).map_err(|source| TrackerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a save file.
///
/// A malformed header or an out-of-range combatant count aborts the whole
/// load with [`TrackerError::CorruptSave`]; a malformed combatant record is
/// skipped (counted in [`LoadResult::skipped`]) and parsing continues.
/// `next_id` is recomputed from the loaded ids so hand-edited files cannot
/// introduce collisions. The caller's in-memory state is untouched by any
/// failure here.
pub fn read_save(path: &Path, max_combatants: usize) -> TrackerResult<LoadResult> {
    let content = fs::read_to_string(path).map_err(|source| TrackerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| TrackerError::CorruptSave("empty file".into()))?;
    let (round, current_raw, selected_raw, count) = parse_header(header, max_combatants)?;

    let mut roster: Vec<Combatant> = Vec::new();
    let mut skipped = 0usize;
    for line in lines.take(count) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(line) {
            Some(c) if roster.iter().all(|other| other.id != c.id) => roster.push(c),
            _ => skipped += 1,
        }
    }

    let current_turn = resolve_id(current_raw, &roster);
    let selected = resolve_id(selected_raw, &roster);
    let next_id = roster
        .iter()
        .map(|c| c.id.get())
        .max()
        .and_then(|max| max.checked_add(1))
        .unwrap_or(1);

    Ok(LoadResult {
        data: SaveData {
            round,
            next_id,
            current_turn,
            selected,
            roster,
        },
        skipped,
    })
}

fn parse_header(line: &str, max_combatants: usize) -> TrackerResult<(u32, i64, i64, usize)> {
    let corrupt = |msg: &str| TrackerError::CorruptSave(format!("header: {msg}"));

    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 5 {
        return Err(corrupt("expected 5 fields"));
    }
    let round: u32 = fields[0]
        .trim()
        .parse()
        .map_err(|_| corrupt("bad round"))?;
    if round == 0 {
        return Err(corrupt("round must be at least 1"));
    }
    // nextId is parsed for structural validity but recomputed after load.
    let _next_id: u32 = fields[1]
        .trim()
        .parse()
        .map_err(|_| corrupt("bad next id"))?;
    let count: usize = fields[2]
        .trim()
        .parse()
        .map_err(|_| corrupt("bad combatant count"))?;
    if count > max_combatants {
        return Err(corrupt(&format!(
            "combatant count {count} exceeds the {max_combatants} cap"
        )));
    }
    let current: i64 = fields[3]
        .trim()
        .parse()
        .map_err(|_| corrupt("bad current turn id"))?;
    let selected: i64 = fields[4]
        .trim()
        .parse()
        .map_err(|_| corrupt("bad selected id"))?;
    Ok((round, current, selected, count))
}

/// Parse one combatant line. Returns `None` if any required field (the
/// first eight) is missing or malformed; trailing fields default to 0.
fn parse_record(line: &str) -> Option<Combatant> {
    let fields: Vec<&str> = line.split('|').collect();
    if fields.len() < 8 {
        return None;
    }

    let id: u32 = fields[0].trim().parse().ok()?;
    let name = fields[1].trim();
    if name.is_empty() {
        return None;
    }
    let faction = Faction::from_code(fields[2].trim().parse().ok()?)?;
    let initiative: i32 = fields[3].trim().parse().ok()?;
    let dexterity: i32 = fields[4].trim().parse().ok()?;
    let max_hp: i32 = fields[5].trim().parse().ok()?;
    if max_hp < 1 {
        return None;
    }
    let hp: i32 = fields[6].trim().parse().ok()?;
    let bits: u16 = fields[7].trim().parse().ok()?;

    let tail_u8 = |i: usize| -> u8 {
        fields
            .get(i)
            .and_then(|f| f.trim().parse::<u8>().ok())
            .unwrap_or(0)
    };
    let tail_flag = |i: usize| -> bool { tail_u8(i) != 0 };

    let mut c = Combatant::new(
        CombatantId::new(id),
        name,
        faction,
        initiative,
        dexterity,
        max_hp,
    );
    c.hp = hp.clamp(0, max_hp);
    c.conditions = ConditionSet::from_bits(bits);
    c.save_successes = tail_u8(8).min(3);
    c.save_failures = tail_u8(9).min(3);
    c.stable = tail_flag(10);
    c.dead = tail_flag(11);

    for (j, condition) in sk_core::Condition::ALL.into_iter().enumerate() {
        let rounds = fields
            .get(12 + j)
            .and_then(|f| f.trim().parse::<u32>().ok())
            .unwrap_or(0);
        // Durations only apply to active conditions; stale columns are dropped.
        if rounds > 0 && c.conditions.contains(condition) {
            let _ = c.set_duration(condition, rounds);
        }
    }

    // Re-establish the state-machine invariants on hand-edited data.
    if c.hp > 0 {
        c.reset_death_saves();
        c.dead = false;
    } else if c.faction == Faction::Enemy {
        // Enemies at 0 HP are dead; legacy files predate the flag.
        c.dead = true;
        c.stable = false;
    } else if c.dead {
        c.stable = false;
    }

    Some(c)
}

fn resolve_id(raw: i64, roster: &[Combatant]) -> Option<CombatantId> {
    let id = u32::try_from(raw).ok().map(CombatantId::new)?;
    roster.iter().any(|c| c.id == id).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sk_core::Condition;

    fn sample_data() -> SaveData {
        let mut aria = Combatant::new(CombatantId::new(1), "Aria", Faction::Player, 15, 2, 20);
        aria.adjust_hp(-7);
        aria.toggle_condition(Condition::Poisoned);
        aria.set_duration(Condition::Poisoned, 3).unwrap();

        let mut orc = Combatant::new(CombatantId::new(2), "Orc", Faction::Enemy, 10, 0, 15);
        orc.toggle_condition(Condition::Prone);

        SaveData {
            round: 4,
            next_id: 3,
            current_turn: Some(CombatantId::new(2)),
            selected: Some(CombatantId::new(1)),
            roster: vec![aria, orc],
        }
    }

    #[test]
    fn roundtrip_preserves_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");

        let data = sample_data();
        write_save(&path, &data).unwrap();
        let loaded = read_save(&path, 50).unwrap();

        assert_eq!(loaded.skipped, 0);
        assert_eq!(loaded.data.round, 4);
        assert_eq!(loaded.data.current_turn, data.current_turn);
        assert_eq!(loaded.data.selected, data.selected);
        assert_eq!(loaded.data.roster, data.roster);
        assert_eq!(loaded.data.next_id, 3);
    }

    #[test]
    fn missing_trailing_fields_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        // Legacy record: required fields only, no death saves, no durations.
        std::fs::write(&path, "2|5|1|1|-1\n1|Aria|0|15|2|20|0|8192\n").unwrap();

        let loaded = read_save(&path, 50).unwrap();
        assert_eq!(loaded.skipped, 0);
        let c = &loaded.data.roster[0];
        assert_eq!(c.save_successes, 0);
        assert_eq!(c.save_failures, 0);
        assert!(!c.stable);
        assert!(!c.dead);
        assert!(c.conditions.contains(Condition::Unconscious));
        assert_eq!(c.duration(Condition::Unconscious), 0);
    }

    #[test]
    fn malformed_record_is_skipped_and_parsing_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        std::fs::write(
            &path,
            "1|4|3|-1|-1\n1|Aria|0|15|2|20|20|0\n2||1|ten|0|15|15|0\n3|Orc|1|10|0|15|15|0\n",
        )
        .unwrap();

        let loaded = read_save(&path, 50).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.data.roster.len(), 2);
        assert_eq!(loaded.data.next_id, 4);
    }

    #[test]
    fn duplicate_id_record_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        std::fs::write(
            &path,
            "1|2|2|-1|-1\n1|Aria|0|15|2|20|20|0\n1|Copy|0|9|0|5|5|0\n",
        )
        .unwrap();

        let loaded = read_save(&path, 50).unwrap();
        assert_eq!(loaded.skipped, 1);
        assert_eq!(loaded.data.roster.len(), 1);
        assert_eq!(loaded.data.roster[0].name, "Aria");
    }

    #[test]
    fn corrupt_header_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        std::fs::write(&path, "not-a-round|1|0|-1|-1\n").unwrap();
        assert!(matches!(
            read_save(&path, 50),
            Err(TrackerError::CorruptSave(_))
        ));
    }

    #[test]
    fn out_of_range_count_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        std::fs::write(&path, "1|1|999|-1|-1\n").unwrap();
        assert!(matches!(
            read_save(&path, 50),
            Err(TrackerError::CorruptSave(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error_with_path() {
        let err = read_save(Path::new("/no/such/save.txt"), 50).unwrap_err();
        assert!(matches!(err, TrackerError::Io { .. }));
        assert!(err.to_string().contains("/no/such/save.txt"));
    }

    #[test]
    fn stale_cursor_ids_are_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        // Current turn points at id 9, which no record provides.
        std::fs::write(&path, "1|2|1|9|9\n1|Aria|0|15|2|20|20|0\n").unwrap();

        let loaded = read_save(&path, 50).unwrap();
        assert_eq!(loaded.data.current_turn, None);
        assert_eq!(loaded.data.selected, None);
    }

    #[test]
    fn hand_edited_invariants_are_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        // hp above max, counters above 3, stable and dead both set.
        std::fs::write(
            &path,
            "1|3|2|-1|-1\n1|Aria|0|15|2|20|99|0|7|9|1|1\n2|Bea|0|9|1|10|0|0|0|0|1|1\n",
        )
        .unwrap();

        let loaded = read_save(&path, 50).unwrap();
        let aria = &loaded.data.roster[0];
        assert_eq!(aria.hp, 20);
        assert!(!aria.dead);
        assert!(!aria.stable);
        assert_eq!(aria.save_successes, 0);

        let bea = &loaded.data.roster[1];
        assert!(bea.dead);
        assert!(!bea.stable);
    }

    #[test]
    fn next_id_recomputed_from_max_loaded_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.txt");
        // Header claims nextId 2, but a hand-added record uses id 40.
        std::fs::write(
            &path,
            "1|2|2|-1|-1\n1|Aria|0|15|2|20|20|0\n40|Orc|1|10|0|15|15|0\n",
        )
        .unwrap();

        let loaded = read_save(&path, 50).unwrap();
        assert_eq!(loaded.data.next_id, 41);
    }
}
