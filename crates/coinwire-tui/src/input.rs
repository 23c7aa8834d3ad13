use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Mode};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    JumpToTop,
    JumpToBottom,
    PendingG, // First 'g' press, waiting for second 'g'
    OpenInBrowser,
    Refresh,
    StartSearch,
    ClearSearch,
    NextFilter,
    PrevFilter,
    SelectFilter(usize),
    Help,
    ExitMode,
    Confirm,
    Cancel,
    InputChar(char),
    Backspace,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    // Handle input mode (search)
    if app.is_input_mode() {
        return handle_input_mode(key);
    }

    if app.mode == Mode::Help {
        // Any key exits help
        return Action::ExitMode;
    }

    // Normal mode keybindings
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Navigation
        (KeyCode::Char('j'), KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Down, KeyModifiers::NONE) => Action::MoveDown,
        (KeyCode::Up, KeyModifiers::NONE) => Action::MoveUp,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::ScrollHalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ScrollHalfPageUp,

        // Jump to top/bottom
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            // gg requires double press
            if app.pending_key == Some('g') {
                Action::JumpToTop
            } else {
                Action::PendingG
            }
        }
        (KeyCode::Char('G'), _) => Action::JumpToBottom,

        // Filters
        (KeyCode::Tab, KeyModifiers::NONE) => Action::NextFilter,
        (KeyCode::BackTab, _) => Action::PrevFilter,
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::SelectFilter(c as usize - '1' as usize)
        }

        // Article actions
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::OpenInBrowser,
        (KeyCode::Enter, KeyModifiers::NONE) => Action::OpenInBrowser,
        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Refresh,

        // Search
        (KeyCode::Char('/'), KeyModifiers::NONE) => Action::StartSearch,
        (KeyCode::Esc, KeyModifiers::NONE) => Action::ClearSearch,

        (KeyCode::Char('?'), _) => Action::Help,

        _ => Action::None,
    }
}

/// Handle key events in input mode (search)
fn handle_input_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::Confirm,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Char(c) => Action::InputChar(c),
        _ => Action::None,
    }
}

/// Apply an action that only touches UI state.
///
/// Returns the action back when the caller has to act on it (quit,
/// refresh, opening a link); everything else is consumed here.
pub fn apply_action(app: &mut App, action: Action) -> Option<Action> {
    // Any action other than the first 'g' cancels a pending sequence
    if action != Action::PendingG {
        app.clear_pending_key();
    }

    match action {
        Action::MoveDown => app.move_down(),
        Action::MoveUp => app.move_up(),
        Action::ScrollHalfPageDown => app.scroll_half_page_down(),
        Action::ScrollHalfPageUp => app.scroll_half_page_up(),
        Action::JumpToTop => app.jump_to_top(),
        Action::JumpToBottom => app.jump_to_bottom(),
        Action::PendingG => app.pending_key = Some('g'),
        Action::NextFilter => app.next_filter(),
        Action::PrevFilter => app.prev_filter(),
        Action::SelectFilter(index) => app.select_filter(index),
        Action::StartSearch => app.start_search(),
        Action::ClearSearch => app.clear_search(),
        Action::InputChar(c) => app.push_search_char(c),
        Action::Backspace => app.pop_search_char(),
        Action::Confirm => app.confirm_search(),
        Action::Cancel => app.cancel_search(),
        Action::Help => app.show_help(),
        Action::ExitMode => app.exit_mode(),
        Action::None => {}
        Action::Quit | Action::Refresh | Action::OpenInBrowser => return Some(action),
    }
    None
}
