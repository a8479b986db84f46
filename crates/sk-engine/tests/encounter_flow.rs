//! End-to-end encounter flow through the public engine surface.

use sk_core::Faction;
use sk_engine::{Encounter, EncounterConfig, TrackerError};

fn aria_and_orc() -> Encounter {
    let mut enc = Encounter::new(EncounterConfig::default());
    enc.add("Aria", Faction::Player, 15, 2, 20).unwrap();
    enc.add("Orc", Faction::Enemy, 10, 0, 15).unwrap();
    enc
}

#[test]
fn basic_skirmish_flow() {
    let mut enc = aria_and_orc();

    // Aria (higher initiative) leads the order and holds the first turn.
    assert_eq!(enc.roster()[0].name, "Aria");
    assert_eq!(enc.roster()[1].name, "Orc");
    let aria_id = enc.roster()[0].id;
    assert_eq!(enc.current_turn(), Some(aria_id));

    // A full cycle of turns returns to Aria and advances the round.
    enc.next_turn().unwrap(); // Orc
    assert_eq!(enc.round(), 1);
    enc.next_turn().unwrap(); // wrap back to Aria
    assert_eq!(enc.current_turn(), Some(aria_id));
    assert_eq!(enc.round(), 2);

    // Damaging the Orc to 0 kills it outright; enemies never roll saves.
    enc.move_selection(1);
    assert_eq!(enc.selected_combatant().unwrap().name, "Orc");
    enc.edit_hp(-20, false).unwrap();
    let orc = enc.selected_combatant().unwrap();
    assert_eq!(orc.hp, 0);
    assert!(orc.dead);
    assert_eq!(orc.save_failures, 0);
    assert!(!orc.is_dying());
}

#[test]
fn full_session_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let save_path = dir.path().join("skirmish_save.txt");

    let mut enc = aria_and_orc();
    enc.edit_hp(-6, false).unwrap();
    enc.next_turn().unwrap();
    enc.duplicate_selected(1).unwrap();
    enc.save(&save_path).unwrap();

    let expected_roster = enc.roster().to_vec();
    let expected_round = enc.round();
    let expected_turn = enc.current_turn();

    let mut restored = Encounter::new(EncounterConfig::default());
    let outcome = restored.load(&save_path).unwrap();
    assert_eq!(outcome.loaded, expected_roster.len());
    assert_eq!(outcome.skipped, 0);
    assert_eq!(restored.roster(), expected_roster.as_slice());
    assert_eq!(restored.round(), expected_round);
    assert_eq!(restored.current_turn(), expected_turn);

    // Ids stay unique across the reload: adding cannot collide.
    let new_id = restored.add("Wolf", Faction::Enemy, 8, 2, 11).unwrap();
    assert!(
        expected_roster.iter().all(|c| c.id != new_id),
        "fresh id collided with a loaded combatant"
    );
}

#[test]
fn undo_walks_back_a_command_sequence() {
    let mut enc = aria_and_orc();
    enc.edit_hp(-5, false).unwrap();
    let hp_after_first = enc.selected_combatant().unwrap().hp;
    enc.edit_hp(-4, false).unwrap();

    enc.undo().unwrap();
    assert_eq!(enc.selected_combatant().unwrap().hp, hp_after_first);
    enc.undo().unwrap();
    enc.undo().unwrap(); // reverts the second add
    enc.undo().unwrap(); // reverts the first add
    assert!(enc.is_empty());
    assert!(matches!(enc.undo(), Err(TrackerError::NothingToUndo)));
}

#[test]
fn exported_log_narrates_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("combat_log_export.txt");

    let mut enc = aria_and_orc();
    enc.next_turn().unwrap();
    enc.next_turn().unwrap();
    enc.export_log(&log_path).unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("COMBAT LOG EXPORT:"));
    assert!(content.contains("[R1] Added Aria: Init 15, HP 20."));
    assert!(content.contains("[R2] --- START OF ROUND 2 ---"));
    assert!(content.contains("--- END OF LOG ---"));
    assert!(enc.log().is_empty());
}
