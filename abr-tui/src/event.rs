//! Keyboard and mouse input

use std::time::Duration;

use abr_core::Page;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Poll for events with timeout
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Result of handling an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleResult {
    Continue,
    Quit,
}

/// Route a terminal event to the app
pub fn handle_event(app: &mut App, event: Event) -> HandleResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => {
            app.handle_mouse(mouse);
            HandleResult::Continue
        }
        _ => HandleResult::Continue,
    }
}

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) -> HandleResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char('c') | KeyCode::Char('q') = key.code {
            return HandleResult::Quit;
        }
    }

    match key.code {
        KeyCode::Char('q') => return HandleResult::Quit,

        // Pages
        KeyCode::Char(']') => app.cycle_page(1),
        KeyCode::Char('[') => app.cycle_page(-1),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if let Some(page) = Page::ALL.get(index) {
                app.goto(*page);
            }
        }

        // Tabs
        KeyCode::Right | KeyCode::Tab => app.select_tab(1),
        KeyCode::Left | KeyCode::BackTab => app.select_tab(-1),
        KeyCode::Char('>') => app.move_tab(1),
        KeyCode::Char('<') => app.move_tab(-1),
        KeyCode::Char('r') => app.refresh_current(),
        KeyCode::Char('R') => app.reset_current(),
        KeyCode::Esc => {
            if app.cancel_drag() {
                app.set_status("Tab drag cancelled");
            }
        }

        // Rows
        KeyCode::Char('n') | KeyCode::PageDown => app.next_rows(),
        KeyCode::Char('p') | KeyCode::PageUp => app.prev_rows(),
        KeyCode::Char('g') | KeyCode::Home => app.first_rows(),
        KeyCode::Char('G') | KeyCode::End => app.last_rows(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.step_page_size(true),
        KeyCode::Char('-') => app.step_page_size(false),

        _ => {}
    }
    HandleResult::Continue
}
