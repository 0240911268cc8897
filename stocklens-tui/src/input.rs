//! Keyboard input: page switching, ticker switching, reload, quit.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Page};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Windows reports both press and release.
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.running = false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.running = false,
        KeyCode::Char(c @ '1'..='4') => {
            if let Some(page) = c.to_digit(10).and_then(|d| Page::from_index(d as usize - 1)) {
                app.page = page;
            }
        }
        KeyCode::Tab => {
            app.page = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.page.prev()
            } else {
                app.page.next()
            };
        }
        KeyCode::BackTab => app.page = app.page.prev(),
        KeyCode::Right | KeyCode::Char('l') => app.next_ticker(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_ticker(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
}
