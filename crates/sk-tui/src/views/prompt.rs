//! The input line (prompts, confirmations, transient messages) and the
//! status bar.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use sk_core::Condition;

use crate::app::{App, Confirm, Mode, Prompt, PromptKind};

/// Draw the line above the status bar: an active prompt, a pending
/// confirmation, or the transient message.
pub fn draw_input_line(frame: &mut Frame, app: &App, area: Rect) {
    // A fresh notice takes priority so rejections are visible mid-prompt.
    if let Some(notice) = &app.notice {
        let style = if notice.error {
            Style::default().fg(Color::White).bg(Color::Red).bold()
        } else {
            Style::default().fg(Color::Black).bg(Color::Green).bold()
        };
        let bar = Paragraph::new(format!(" {} ", notice.text)).style(style);
        frame.render_widget(bar, area);
        return;
    }

    let text = match &app.mode {
        Mode::Prompt(prompt) => format!(" {}{}_", prompt_label(app, prompt), prompt.buffer),
        Mode::Confirm(Confirm::Remove) => {
            let name = app
                .encounter
                .selected_combatant()
                .map(|c| c.name.as_str())
                .unwrap_or("combatant");
            format!(" Delete {name}? (y/n)")
        }
        Mode::Confirm(Confirm::Load) => {
            " Loading will wipe current state. Are you sure? (y/n)".to_string()
        }
        _ => String::new(),
    };

    if text.is_empty() {
        frame.render_widget(Paragraph::new(""), area);
    } else {
        let bar = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(bar, area);
    }
}

/// Draw the key-hint status bar for the active mode.
pub fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let hint = match &app.mode {
        Mode::Roster => {
            "a:add d:del h:hp r:init c:cond u:dup n/p:turn m:save-roll t:stab z:undo s:save l:load e:export \u{2191}/\u{2193}:select q:quit"
        }
        Mode::Prompt(_) => "Enter:confirm  Esc:cancel",
        Mode::Conditions(_) => "\u{2191}/\u{2193}:select  Space/Enter:toggle  d:duration  q:done",
        Mode::Confirm(_) => "y:confirm  n:cancel",
    };
    let status = Paragraph::new(hint).style(Style::default().fg(Color::Black).bg(Color::White));
    frame.render_widget(status, area);
}

fn prompt_label(app: &App, prompt: &Prompt) -> String {
    match &prompt.kind {
        PromptKind::AddFaction => "Type? (P)layer / (E)nemy: ".to_string(),
        PromptKind::AddName { .. } => "Name: ".to_string(),
        PromptKind::AddInitiative { .. } => "Initiative: ".to_string(),
        PromptKind::AddDexterity { .. } => "Dexterity (Tiebreaker): ".to_string(),
        PromptKind::AddMaxHp { .. } => "Max HP: ".to_string(),
        PromptKind::HpDelta => match app.encounter.selected_combatant() {
            Some(c) => format!("{} ({}/{}) Change (+/-): ", c.name, c.hp, c.max_hp),
            None => "Change (+/-): ".to_string(),
        },
        PromptKind::HpCritical { delta } => {
            format!(
                "{} damage to a downed player. Critical hit? (y/n): ",
                delta.saturating_neg()
            )
        }
        PromptKind::RerollValue => "New Init: ".to_string(),
        PromptKind::DuplicateCount => "Copies: ".to_string(),
        PromptKind::DurationRounds { condition_index } => {
            let name = Condition::from_index(*condition_index)
                .map(|c| c.to_string())
                .unwrap_or_default();
            format!("{name} duration (rounds): ")
        }
    }
}
