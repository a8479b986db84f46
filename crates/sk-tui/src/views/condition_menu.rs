//! The full-screen condition menu for the selected combatant.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use sk_core::Condition;

use crate::app::{App, ConditionMenu};

/// Draw the condition list with the menu cursor.
pub fn draw(frame: &mut Frame, app: &App, menu: &ConditionMenu, area: Rect) {
    let Some(combatant) = app.encounter.selected_combatant() else {
        return;
    };

    let block = Block::default()
        .title(format!(" Conditions for: {} ", combatant.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line<'static>> = Vec::new();
    for (i, condition) in Condition::ALL.into_iter().enumerate() {
        let active = combatant.conditions.contains(condition);
        let rounds = combatant.duration(condition);

        let mut text = format!(" [{}] {:<15}", if active { 'X' } else { ' ' }, condition);
        if active && rounds > 0 {
            text.push_str(&format!(" (Duration: {rounds})"));
        }

        let style = if i == menu.cursor {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else if active {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}
