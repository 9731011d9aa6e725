use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.close_menu(),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Right => app.expand_selected(),
        KeyCode::Left => app.collapse_selected(),
        KeyCode::Char('g') => app.select_first(),
        KeyCode::Char('G') => app.select_last(),
        KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Enter | KeyCode::Char('l') => app.activate(),
        KeyCode::Backspace | KeyCode::Char('h') => app.go_up(),
        KeyCode::Char('o') => app.open_with_system_default(),
        KeyCode::Char('e') => app.open_in_editor(),
        KeyCode::Char('y') => app.copy_path(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('[') => app.resize_sidebar(-1.0),
        KeyCode::Char(']') => app.resize_sidebar(1.0),
        _ => {}
    }
}
