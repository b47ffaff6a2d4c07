//! Common key mappings for canvas applications.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::IntVector;

/// Unit step for arrow keys and their `hjkl` / `wasd` aliases.
pub fn direction(key: KeyEvent) -> Option<IntVector> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(IntVector::new(-1, 0)),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(IntVector::new(1, 0)),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(IntVector::new(0, -1)),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(IntVector::new(0, 1)),
        _ => None,
    }
}

/// `q`, `Esc` or Ctrl-C.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
