//! Screen layout and rendering.

pub mod condition_menu;
pub mod log_pane;
pub mod prompt;
pub mod roster;

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{App, Mode};

/// Draw the whole screen for the current frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Roster + log, or the condition menu
            Constraint::Length(1), // Prompt / confirm / transient message
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match &app.mode {
        Mode::Conditions(menu) => condition_menu::draw(frame, app, menu, chunks[1]),
        _ => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
                .split(chunks[1]);
            roster::draw(frame, app, cols[0]);
            log_pane::draw(frame, app, cols[1]);
        }
    }

    prompt::draw_input_line(frame, app, chunks[2]);
    prompt::draw_status(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let text = format!(
        " SKIRMISH | Round: {} | Combatants: {}",
        app.encounter.round(),
        app.encounter.len()
    );
    let header = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::White).bold());
    frame.render_widget(header, area);
}
