//! Terminal state guard for RAII cleanup.
//!
//! This module provides a guard struct that ensures terminal state is
//! properly restored even if the application panics.

use std::io::stdout;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
        EnableFocusChange, EnableMouseCapture,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Guard struct that ensures terminal cleanup on drop (including panics).
///
/// When dropped, this guard:
/// - Disables raw mode
/// - Leaves alternate screen
/// - Disables mouse capture, focus reporting and bracketed paste
/// - Shows the cursor
///
/// # Example
///
/// ```ignore
/// fn run_tui() -> Result<()> {
///     let _guard = TerminalGuard::enter()?;
///     // Run TUI loop...
///     // Guard restores the terminal when the function exits
///     Ok(())
/// }
/// ```
pub struct TerminalGuard;

impl TerminalGuard {
    /// Creates a guard without touching the terminal.
    ///
    /// The guard will restore terminal state when dropped.
    pub fn new() -> Self {
        Self
    }

    /// Puts the terminal in scanner mode and returns the guard that undoes it.
    ///
    /// Scanner mode is raw mode on the alternate screen, with mouse clicks,
    /// focus changes and bracketed paste reported as events.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal rejects any of the mode changes; the
    /// modes already applied are restored before returning.
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = Self::new();
        execute!(
            stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            EnableBracketedPaste
        )
        .context("Failed to configure terminal")?;
        Ok(guard)
    }
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Restores the terminal, ignoring errors.
///
/// Shared with the panic hook, which runs before the guard is dropped.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        stdout(),
        DisableBracketedPaste,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    );
}
