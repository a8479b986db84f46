//! Terminal setup, teardown, and main event loop.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

use crate::app::App;
use crate::views;

/// How long to wait for input before redrawing. Keeps transient messages
/// expiring on time; the engine itself never runs between events.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launch the TUI application.
pub fn run(mut app: App) -> Result<(), String> {
    enable_raw_mode().map_err(|e| format!("terminal error: {e}"))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| format!("terminal error: {e}"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| format!("terminal error: {e}"))?;

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

/// Main event loop.
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), String> {
    loop {
        app.tick();
        terminal
            .draw(|frame| views::draw(frame, app))
            .map_err(|e| format!("draw error: {e}"))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(POLL_INTERVAL).map_err(|e| format!("event error: {e}"))?
            && let Event::Key(key) = event::read().map_err(|e| format!("event error: {e}"))?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
}
