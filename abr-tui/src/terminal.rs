//! Terminal management and main run loop

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::app::{App, AppEvent};
use crate::event::{handle_event, poll_event, HandleResult};
use crate::ui;

/// Initialize the terminal for TUI mode
fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Run the dashboard until the user quits
pub fn run(mut app: App, mut events: UnboundedReceiver<AppEvent>) -> Result<()> {
    let mut terminal = init_terminal()?;

    app.load_orders();
    let result = run_loop(&mut terminal, &mut app, &mut events);

    // Restore terminal (even if loop failed)
    restore_terminal(&mut terminal)?;
    info!("dashboard closed");

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    events: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // 100ms timeout keeps background results flowing in
        if let Some(event) = poll_event(Duration::from_millis(100))? {
            if handle_event(app, event) == HandleResult::Quit {
                app.shutdown();
            }
        }

        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
