//! Application state: input modes, prompts, and command dispatch.
//!
//! The view layer never mutates combat state directly. Every keystroke
//! either navigates, feeds a pending prompt, or resolves into exactly one
//! engine command; abandoning a prompt with Esc leaves the engine untouched.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use sk_core::{Condition, Faction};
use sk_engine::{Encounter, TrackerResult};

/// How long a transient message stays on screen.
const NOTICE_TTL: Duration = Duration::from_millis(1500);

/// Longest input accepted into a prompt buffer.
const PROMPT_BUFFER_MAX: usize = 32;

/// A transient status message.
pub struct Notice {
    /// Message text.
    pub text: String,
    /// Styled as an error rather than a success.
    pub error: bool,
    shown_at: Instant,
}

/// Which input mode the UI is in.
pub enum Mode {
    /// Roster navigation; single-key commands.
    Roster,
    /// Collecting a line (or choice) of input for a pending command.
    Prompt(Prompt),
    /// The condition menu for the selected combatant.
    Conditions(ConditionMenu),
    /// A yes/no confirmation gate.
    Confirm(Confirm),
}

/// A pending prompt and its input buffer.
pub struct Prompt {
    /// What the input is for.
    pub kind: PromptKind,
    /// Text typed so far (unused for key-choice prompts).
    pub buffer: String,
}

impl Prompt {
    fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
        }
    }
}

/// The prompt steps. Adding a combatant walks the variants in order,
/// carrying earlier answers along; nothing reaches the engine until the
/// final step submits.
pub enum PromptKind {
    /// Choose player or enemy (key choice).
    AddFaction,
    /// Type the new combatant's name.
    AddName {
        /// Chosen faction.
        faction: Faction,
    },
    /// Type the initiative score.
    AddInitiative {
        /// Chosen faction.
        faction: Faction,
        /// Entered name.
        name: String,
    },
    /// Type the dexterity tiebreaker.
    AddDexterity {
        /// Chosen faction.
        faction: Faction,
        /// Entered name.
        name: String,
        /// Entered initiative.
        initiative: i32,
    },
    /// Type the hit point maximum.
    AddMaxHp {
        /// Chosen faction.
        faction: Faction,
        /// Entered name.
        name: String,
        /// Entered initiative.
        initiative: i32,
        /// Entered dexterity.
        dexterity: i32,
    },
    /// Type a signed HP change for the selected combatant.
    HpDelta,
    /// Confirm whether damage against a downed player was a critical hit.
    HpCritical {
        /// The damage delta awaiting the answer.
        delta: i32,
    },
    /// Type a replacement initiative value.
    RerollValue,
    /// Type how many copies to create.
    DuplicateCount,
    /// Type a round count for a condition (returns to the menu).
    DurationRounds {
        /// Registry index of the condition being timed.
        condition_index: usize,
    },
}

/// Cursor state for the condition menu.
pub struct ConditionMenu {
    /// Highlighted registry index.
    pub cursor: usize,
}

/// Pending confirmation dialogs.
pub enum Confirm {
    /// Delete the selected combatant.
    Remove,
    /// Load over a live roster.
    Load,
}

/// Top-level application state.
pub struct App {
    /// The combat engine.
    pub encounter: Encounter,
    /// Active input mode.
    pub mode: Mode,
    /// Transient status message, if any.
    pub notice: Option<Notice>,
    /// Set when the user quits.
    pub should_quit: bool,
    /// Where save/load reads and writes.
    pub save_path: PathBuf,
    /// Where the combat log is exported.
    pub export_path: PathBuf,
}

impl App {
    /// Create the app around an engine instance.
    pub fn new(encounter: Encounter, save_path: PathBuf, export_path: PathBuf) -> Self {
        Self {
            encounter,
            mode: Mode::Roster,
            notice: None,
            should_quit: false,
            save_path,
            export_path,
        }
    }

    /// Expire the transient message. Called once per poll tick; has no
    /// effect on engine state.
    pub fn tick(&mut self) {
        if let Some(notice) = &self.notice
            && notice.shown_at.elapsed() >= NOTICE_TTL
        {
            self.notice = None;
        }
    }

    /// Route a key press through the active mode.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        let mode = std::mem::replace(&mut self.mode, Mode::Roster);
        self.mode = match mode {
            Mode::Roster => self.roster_key(key),
            Mode::Prompt(prompt) => self.prompt_key(prompt, key),
            Mode::Conditions(menu) => self.conditions_key(menu, key),
            Mode::Confirm(confirm) => self.confirm_key(confirm, key),
        };
    }

    fn notify(&mut self, text: impl Into<String>, error: bool) {
        self.notice = Some(Notice {
            text: text.into(),
            error,
            shown_at: Instant::now(),
        });
    }

    /// Surface a command result: success message or the engine's reason.
    fn report<T>(&mut self, result: TrackerResult<T>, success: &str) -> bool {
        match result {
            Ok(_) => {
                if !success.is_empty() {
                    self.notify(success, false);
                }
                true
            }
            Err(e) => {
                self.notify(e.to_string(), true);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Roster mode
    // -----------------------------------------------------------------------

    fn roster_key(&mut self, key: KeyEvent) -> Mode {
        let has_roster = !self.encounter.is_empty();
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Mode::Roster
            }
            KeyCode::Char('a') => Mode::Prompt(Prompt::new(PromptKind::AddFaction)),
            KeyCode::Char('d') if has_roster => Mode::Confirm(Confirm::Remove),
            KeyCode::Char('h') if has_roster => Mode::Prompt(Prompt::new(PromptKind::HpDelta)),
            KeyCode::Char('r') if has_roster => Mode::Prompt(Prompt::new(PromptKind::RerollValue)),
            KeyCode::Char('u') if has_roster => {
                Mode::Prompt(Prompt::new(PromptKind::DuplicateCount))
            }
            KeyCode::Char('c') if has_roster => {
                // One undo point covers the whole menu session.
                self.encounter.mark_undo_point();
                Mode::Conditions(ConditionMenu { cursor: 0 })
            }
            KeyCode::Char('n') if has_roster => {
                let result = self.encounter.next_turn();
                self.report(result, "");
                Mode::Roster
            }
            KeyCode::Char('p') if has_roster => {
                let result = self.encounter.prev_turn();
                self.report(result, "");
                Mode::Roster
            }
            KeyCode::Char('m') if has_roster => {
                let result = self.encounter.manual_death_save();
                self.report(result, "Death save rolled.");
                Mode::Roster
            }
            KeyCode::Char('t') if has_roster => {
                let result = self.encounter.stabilize_selected();
                self.report(result, "Stabilized.");
                Mode::Roster
            }
            KeyCode::Char('z') => {
                let result = self.encounter.undo();
                self.report(result, "Undo successful!");
                Mode::Roster
            }
            KeyCode::Char('s') => {
                let result = self.encounter.save(&self.save_path);
                self.report(result, "Game Saved.");
                Mode::Roster
            }
            KeyCode::Char('l') => {
                if has_roster {
                    Mode::Confirm(Confirm::Load)
                } else {
                    self.do_load();
                    Mode::Roster
                }
            }
            KeyCode::Char('e') => {
                let result = self.encounter.export_log(&self.export_path);
                self.report(result, "Log Exported and Cleared!");
                Mode::Roster
            }
            KeyCode::Up => {
                self.encounter.move_selection(-1);
                Mode::Roster
            }
            KeyCode::Down => {
                self.encounter.move_selection(1);
                Mode::Roster
            }
            _ => Mode::Roster,
        }
    }

    fn do_load(&mut self) {
        match self.encounter.load(&self.save_path) {
            Ok(outcome) if outcome.skipped > 0 => self.notify(
                format!(
                    "Game Loaded ({} combatants, {} corrupt records skipped).",
                    outcome.loaded, outcome.skipped
                ),
                false,
            ),
            Ok(_) => self.notify("Game Loaded.", false),
            Err(e) => self.notify(e.to_string(), true),
        }
    }

    // -----------------------------------------------------------------------
    // Prompt mode
    // -----------------------------------------------------------------------

    fn prompt_key(&mut self, mut prompt: Prompt, key: KeyEvent) -> Mode {
        // Key-choice prompts never use the buffer.
        match &prompt.kind {
            PromptKind::AddFaction => return self.faction_choice_key(key),
            PromptKind::HpCritical { delta } => {
                let delta = *delta;
                return self.critical_choice_key(delta, key);
            }
            _ => {}
        }

        match key.code {
            KeyCode::Esc => self.cancel_prompt(&prompt.kind),
            KeyCode::Backspace => {
                prompt.buffer.pop();
                Mode::Prompt(prompt)
            }
            KeyCode::Char(c) => {
                if prompt.buffer.chars().count() < PROMPT_BUFFER_MAX {
                    prompt.buffer.push(c);
                }
                Mode::Prompt(prompt)
            }
            KeyCode::Enter => self.submit_prompt(prompt),
            _ => Mode::Prompt(prompt),
        }
    }

    /// Where Esc lands: duration prompts fall back into the condition menu,
    /// everything else returns to the roster with no mutation.
    fn cancel_prompt(&mut self, kind: &PromptKind) -> Mode {
        match kind {
            PromptKind::DurationRounds { condition_index } => Mode::Conditions(ConditionMenu {
                cursor: *condition_index,
            }),
            _ => Mode::Roster,
        }
    }

    fn faction_choice_key(&mut self, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Esc => Mode::Roster,
            KeyCode::Char('p') | KeyCode::Char('P') => Mode::Prompt(Prompt::new(
                PromptKind::AddName {
                    faction: Faction::Player,
                },
            )),
            KeyCode::Char('e') | KeyCode::Char('E') => Mode::Prompt(Prompt::new(
                PromptKind::AddName {
                    faction: Faction::Enemy,
                },
            )),
            _ => Mode::Prompt(Prompt::new(PromptKind::AddFaction)),
        }
    }

    fn critical_choice_key(&mut self, delta: i32, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Esc => Mode::Roster,
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = self.encounter.edit_hp(delta, true);
                self.report(result, "");
                Mode::Roster
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                let result = self.encounter.edit_hp(delta, false);
                self.report(result, "");
                Mode::Roster
            }
            _ => Mode::Prompt(Prompt::new(PromptKind::HpCritical { delta })),
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) -> Mode {
        let Prompt { kind, buffer } = prompt;
        match kind {
            PromptKind::AddFaction | PromptKind::HpCritical { .. } => Mode::Roster,
            PromptKind::AddName { faction } => {
                let name = buffer.trim().to_string();
                if name.is_empty() {
                    self.notify("Name cannot be empty.", true);
                    Mode::Prompt(Prompt {
                        kind: PromptKind::AddName { faction },
                        buffer,
                    })
                } else {
                    Mode::Prompt(Prompt::new(PromptKind::AddInitiative { faction, name }))
                }
            }
            PromptKind::AddInitiative { faction, name } => match parse_i32(&buffer) {
                Some(initiative) => Mode::Prompt(Prompt::new(PromptKind::AddDexterity {
                    faction,
                    name,
                    initiative,
                })),
                None => self.retry_number(PromptKind::AddInitiative { faction, name }),
            },
            PromptKind::AddDexterity {
                faction,
                name,
                initiative,
            } => match parse_i32(&buffer) {
                Some(dexterity) => Mode::Prompt(Prompt::new(PromptKind::AddMaxHp {
                    faction,
                    name,
                    initiative,
                    dexterity,
                })),
                None => self.retry_number(PromptKind::AddDexterity {
                    faction,
                    name,
                    initiative,
                }),
            },
            PromptKind::AddMaxHp {
                faction,
                name,
                initiative,
                dexterity,
            } => match parse_i32(&buffer) {
                Some(max_hp) => {
                    let result = self
                        .encounter
                        .add(&name, faction, initiative, dexterity, max_hp);
                    self.report(result, &format!("Added {name}."));
                    Mode::Roster
                }
                None => self.retry_number(PromptKind::AddMaxHp {
                    faction,
                    name,
                    initiative,
                    dexterity,
                }),
            },
            PromptKind::HpDelta => match parse_i32(&buffer) {
                Some(delta) => {
                    let down_player = self
                        .encounter
                        .selected_combatant()
                        .is_some_and(|c| c.faction == Faction::Player && c.hp == 0 && !c.dead);
                    if delta < 0 && down_player {
                        Mode::Prompt(Prompt::new(PromptKind::HpCritical { delta }))
                    } else {
                        let result = self.encounter.edit_hp(delta, false);
                        self.report(result, "");
                        Mode::Roster
                    }
                }
                None => self.retry_number(PromptKind::HpDelta),
            },
            PromptKind::RerollValue => match parse_i32(&buffer) {
                Some(value) => {
                    let result = self.encounter.reroll_initiative(value);
                    self.report(result, "");
                    Mode::Roster
                }
                None => self.retry_number(PromptKind::RerollValue),
            },
            PromptKind::DuplicateCount => match parse_u32(&buffer) {
                Some(copies) => {
                    let result = self.encounter.duplicate_selected(copies);
                    self.report(result, "");
                    Mode::Roster
                }
                None => self.retry_number(PromptKind::DuplicateCount),
            },
            PromptKind::DurationRounds { condition_index } => match parse_u32(&buffer) {
                Some(rounds) => {
                    let result = self.encounter.set_condition_duration(condition_index, rounds);
                    self.report(result, "");
                    Mode::Conditions(ConditionMenu {
                        cursor: condition_index,
                    })
                }
                None => self.retry_number(PromptKind::DurationRounds { condition_index }),
            },
        }
    }

    fn retry_number(&mut self, kind: PromptKind) -> Mode {
        self.notify("Invalid Number!", true);
        Mode::Prompt(Prompt::new(kind))
    }

    // -----------------------------------------------------------------------
    // Condition menu
    // -----------------------------------------------------------------------

    fn conditions_key(&mut self, mut menu: ConditionMenu, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Mode::Roster,
            KeyCode::Up => {
                menu.cursor = menu
                    .cursor
                    .checked_sub(1)
                    .unwrap_or(Condition::COUNT - 1);
                Mode::Conditions(menu)
            }
            KeyCode::Down => {
                menu.cursor = (menu.cursor + 1) % Condition::COUNT;
                Mode::Conditions(menu)
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let result = self.encounter.toggle_condition(menu.cursor);
                self.report(result, "");
                Mode::Conditions(menu)
            }
            KeyCode::Char('d') => {
                let active = self
                    .encounter
                    .selected_combatant()
                    .and_then(|c| Condition::from_index(menu.cursor).map(|cond| (c, cond)))
                    .is_some_and(|(c, cond)| c.conditions.contains(cond));
                if active {
                    Mode::Prompt(Prompt::new(PromptKind::DurationRounds {
                        condition_index: menu.cursor,
                    }))
                } else {
                    self.notify("Enable condition first!", true);
                    Mode::Conditions(menu)
                }
            }
            _ => Mode::Conditions(menu),
        }
    }

    // -----------------------------------------------------------------------
    // Confirmation dialogs
    // -----------------------------------------------------------------------

    fn confirm_key(&mut self, confirm: Confirm, key: KeyEvent) -> Mode {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                match confirm {
                    Confirm::Remove => {
                        let result = self.encounter.remove_selected();
                        self.report(result, "Removed.");
                    }
                    Confirm::Load => self.do_load(),
                }
                Mode::Roster
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Roster,
            _ => Mode::Confirm(confirm),
        }
    }
}

fn parse_i32(buffer: &str) -> Option<i32> {
    buffer.trim().parse().ok()
}

fn parse_u32(buffer: &str) -> Option<u32> {
    buffer.trim().parse().ok()
}
