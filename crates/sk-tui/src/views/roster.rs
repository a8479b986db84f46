//! The split roster view: players on top, enemies below.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use sk_core::{Combatant, Faction};

use crate::app::App;

/// Draw both faction lists.
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_faction(frame, app, halves[0], Faction::Player, " PLAYERS ");
    draw_faction(frame, app, halves[1], Faction::Enemy, " ENEMIES ");
}

fn draw_faction(frame: &mut Frame, app: &App, area: Rect, faction: Faction, title: &str) {
    let border_color = match faction {
        Faction::Player => Color::Cyan,
        Faction::Enemy => Color::Red,
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 2 || inner.width < 20 {
        return;
    }

    let members: Vec<&Combatant> = app
        .encounter
        .roster()
        .iter()
        .filter(|c| c.faction == faction)
        .collect();

    let mut lines: Vec<Line<'static>> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!(
            "  {:<20} {:>4} {:>4} {:>10}  {}",
            "Name", "Init", "Dex", "HP", "Conditions"
        ),
        Style::default().fg(Color::DarkGray).underlined(),
    )));

    if members.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (None)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the selected row visible in short panes.
    let visible = inner.height as usize - 1;
    let selected_pos = members
        .iter()
        .position(|c| app.encounter.selected() == Some(c.id));
    let scroll = match selected_pos {
        Some(pos) if pos >= visible => pos + 1 - visible,
        _ => 0,
    };

    for c in members.iter().skip(scroll).take(visible) {
        lines.push(combatant_line(app, c));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn combatant_line(app: &App, c: &Combatant) -> Line<'static> {
    let is_current = app.encounter.current_turn() == Some(c.id);
    let is_selected = app.encounter.selected() == Some(c.id);

    let mut spans = Vec::new();
    spans.push(Span::styled(
        if is_current { "> " } else { "  " },
        Style::default().fg(Color::Green).bold(),
    ));

    let name_color = match c.faction {
        Faction::Player => Color::Cyan,
        Faction::Enemy => Color::Red,
    };
    let mut name_style = Style::default().fg(name_color);
    if is_current {
        name_style = name_style.bold();
    }
    spans.push(Span::styled(format!("{:<20}", c.name), name_style));

    spans.push(Span::raw(format!(" {:>4} {:>4}", c.initiative, c.dexterity)));

    let (hp_text, hp_color) = hp_cell(c);
    spans.push(Span::styled(
        format!(" {hp_text:>10}"),
        Style::default().fg(hp_color),
    ));

    spans.push(Span::styled(
        format!("  {}", condition_summary(c)),
        Style::default().fg(Color::DarkGray),
    ));

    let mut line = Line::from(spans);
    if is_selected {
        line = line.style(Style::default().bg(Color::Rgb(40, 40, 70)));
    }
    line
}

/// The HP cell: numbers while up, the dying/dead state while down.
fn hp_cell(c: &Combatant) -> (String, Color) {
    if c.dead {
        return ("DEAD".to_string(), Color::Red);
    }
    if c.hp == 0 {
        if c.stable {
            return ("STABLE".to_string(), Color::Magenta);
        }
        return (
            format!("DOWN S{}/F{}", c.save_successes, c.save_failures),
            Color::Magenta,
        );
    }
    let color = if c.hp <= c.max_hp / 4 {
        Color::Magenta
    } else if c.hp <= c.max_hp / 2 {
        Color::Yellow
    } else {
        Color::Green
    };
    (format!("{}/{}", c.hp, c.max_hp), color)
}

fn condition_summary(c: &Combatant) -> String {
    let parts: Vec<String> = c
        .conditions
        .iter()
        .map(|condition| {
            let rounds = c.duration(condition);
            if rounds > 0 {
                format!("{condition}({rounds})")
            } else {
                condition.to_string()
            }
        })
        .collect();
    parts.join(" ")
}
