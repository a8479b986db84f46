//! The recent combat-log pane.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::App;

/// Draw the most recent log entries, newest at the bottom.
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Combat Log ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 1 {
        return;
    }

    let lines: Vec<Line<'static>> = app
        .encounter
        .log()
        .recent(inner.height as usize)
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("[R{}] ", entry.round),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(entry.message.clone(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
