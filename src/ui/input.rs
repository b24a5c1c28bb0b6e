use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::ui::app_state::{AppState, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    Cancel,
    Rescan,
    Export,
    ConfirmDelete,
}

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> InputAction {
    // Handle Ctrl+C globally
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return InputAction::Quit;
    }

    match state.view_mode {
        ViewMode::Scanning | ViewMode::Deleting => handle_busy_mode(key, state),
        ViewMode::Results => handle_results_mode(key, state),
        ViewMode::Confirm => handle_confirm_mode(key, state),
        ViewMode::Help => handle_help_mode(key, state),
    }
}

fn handle_busy_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Esc | KeyCode::Char('c') => {
            state.cancelling();
            InputAction::Cancel
        }
        KeyCode::Char('q') => {
            state.should_quit = true;
            InputAction::Quit
        }
        KeyCode::Char('?') => {
            state.toggle_help();
            InputAction::None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.move_down();
            InputAction::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.move_up();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_results_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Char('q') => {
            state.should_quit = true;
            InputAction::Quit
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.move_down();
            InputAction::None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.move_up();
            InputAction::None
        }
        KeyCode::Char('d') => {
            state.ask_confirm();
            InputAction::None
        }
        KeyCode::Char('r') => InputAction::Rescan,
        KeyCode::Char('x') => InputAction::Export,
        KeyCode::Char('?') => {
            state.toggle_help();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_confirm_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => InputAction::ConfirmDelete,
        KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => {
            state.dismiss_confirm();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_help_mode(key: KeyEvent, state: &mut AppState) -> InputAction {
    match key.code {
        KeyCode::Char('c') if state.is_busy() => {
            state.cancelling();
            state.toggle_help();
            InputAction::Cancel
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.toggle_help();
            InputAction::None
        }
        _ => InputAction::None,
    }
}

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
