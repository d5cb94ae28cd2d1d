// The interactive front end. It only renders session state and forwards key
// presses; every selection rule lives in `session`/`selection`.
mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use self::run_tui::run_tui;

mod run_tui {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use crate::output::OutputMode;
    use crate::session::Session;
    use anyhow::Result;
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};
    use std::time::Duration;

    pub fn run_tui(session: Session, output_mode: OutputMode, poll_interval: Duration) -> Result<()> {
        let mut app = TuiApp::new(session, output_mode, poll_interval);
        let mut terminal = init_terminal()?;

        let result = run_loop(&mut terminal, &mut app);
        // Give the terminal back even when the loop failed.
        restore_terminal(terminal)?;
        result?;

        println!("{}", app.status);
        Ok(())
    }

    fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut TuiApp) -> Result<()> {
        while !app.quit {
            terminal.draw(|frame| ui_frame(frame, app))?;
            handle_events(app)?;
        }
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor().map_err(Into::into)
    }
}
