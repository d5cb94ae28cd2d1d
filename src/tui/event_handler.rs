use super::app_logic::TuiApp;
use super::app_state::AppMode;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::{Duration, Instant};

const INPUT_POLL: Duration = Duration::from_millis(50);

pub(super) fn handle_events(app: &mut TuiApp) -> Result<()> {
    // Never sleep past a scheduled change poll.
    let wait = app
        .timer
        .until_due(Instant::now())
        .map_or(INPUT_POLL, |due| due.min(INPUT_POLL));

    if event::poll(wait)? {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                match app.mode {
                    AppMode::Normal => app.handle_normal_mode_input(key_event),
                    AppMode::EditingFilter(field) => app.handle_filtering_mode_input(field, key_event),
                }
            }
        }
    }
    app.run_due_poll(Instant::now());
    Ok(())
}
