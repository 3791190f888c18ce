//! Terminal input mapping.
//!
//! Converts crossterm events into [`AppAction`]s. A keyboard-wedge scanner
//! types the code followed by Enter, so every printable character goes to
//! the capture; only control chords and Esc are reserved.
//!
//! # Bindings
//!
//! - `Enter` commits the captured value
//! - `Backspace` deletes the last character
//! - `Esc` closes the result dialog
//! - `Ctrl+N` turns the "awaiting scan" indicator back on
//! - `Ctrl+C` / `Ctrl+Q` quit
//! - any mouse button press refocuses the capture

// Rust guideline compliant 2026-01

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

/// Something the operator (or scanner) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Append a character to the capture.
    InsertChar(char),
    /// Delete the last captured character.
    DeleteChar,
    /// Commit the captured value (scanner terminator).
    Commit,
    /// Replace the captured value wholesale and commit it.
    ///
    /// Used by line-oriented hosts such as headless mode.
    Submit(String),
    /// Pasted text; each line is committed separately.
    Paste(String),
    /// Pointer click anywhere in the window.
    PointerClick,
    /// Host window gained focus.
    FocusGained,
    /// Host window lost focus.
    FocusLost,
    /// Close the result dialog.
    Dismiss,
    /// Return to waiting for a scan.
    Rescan,
    /// Exit the application.
    Quit,
}

/// Maps a terminal event to an action, or `None` if it is ignored.
pub fn event_to_action(event: &Event) -> Option<AppAction> {
    match event {
        Event::Key(key) => key_to_action(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) => Some(AppAction::PointerClick),
            _ => None,
        },
        Event::FocusGained => Some(AppAction::FocusGained),
        Event::FocusLost => Some(AppAction::FocusLost),
        Event::Paste(text) => Some(AppAction::Paste(text.clone())),
        Event::Resize(..) => None,
    }
}

fn key_to_action(key: &KeyEvent) -> Option<AppAction> {
    // Release/repeat events only arrive with keyboard enhancement enabled.
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c' | 'q') => Some(AppAction::Quit),
            KeyCode::Char('n') => Some(AppAction::Rescan),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(AppAction::Dismiss),
        KeyCode::Enter => Some(AppAction::Commit),
        KeyCode::Backspace => Some(AppAction::DeleteChar),
        KeyCode::Char(c) => Some(AppAction::InsertChar(c)),
        _ => None,
    }
}
