//! Scan capture: turns keystrokes from a keyboard-wedge scanner into scans.
//!
//! A barcode scanner in keyboard mode "types" the code and terminates it
//! with Enter. [`ScanCapture`] owns the buffer those characters land in and
//! emits one [`ScanEvent`] per non-empty committed value.
//!
//! # Focus discipline
//!
//! The capture must stay focused for keystrokes to reach it. It regains
//! focus on any pointer click, and after every committed scan it schedules
//! a deferred refocus (see [`crate::constants::REFOCUS_DELAY`]). Callers
//! treat every focus gain as "awaiting scan" and tell the dispatcher so.
//!
//! ```text
//! key chars ──► buffer ──Enter──► on_change(value) ──► ScanEvent
//!                                       │
//!                                       └──► clear buffer, schedule refocus
//! ```
//!
//! There is no debouncing: identical codes scanned back to back are two
//! scans.

use std::time::{Duration, Instant};

use tui_input::{Input, InputRequest};

use crate::record::ScanEvent;

/// The always-focused capture input.
#[derive(Debug)]
pub struct ScanCapture {
    /// Characters typed since the last commit.
    input: Input,
    /// Whether keystrokes currently reach the buffer.
    focused: bool,
    /// Delay between a commit and the scheduled refocus.
    refocus_delay: Duration,
    /// Pending refocus deadline, if any.
    refocus_at: Option<Instant>,
}

impl ScanCapture {
    /// Creates an unfocused, empty capture.
    pub fn new(refocus_delay: Duration) -> Self {
        Self {
            input: Input::default(),
            focused: false,
            refocus_delay,
            refocus_at: None,
        }
    }

    /// Current buffer contents.
    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Whether the capture currently receives keystrokes.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Appends a character typed by the device.
    ///
    /// Returns `false` if the capture is unfocused and the keystroke was
    /// dropped.
    pub fn insert_char(&mut self, c: char) -> bool {
        if !self.focused {
            return false;
        }
        self.input.handle(InputRequest::InsertChar(c));
        true
    }

    /// Removes the last character (manual correction at the keyboard).
    pub fn delete_char(&mut self) {
        if self.focused {
            self.input.handle(InputRequest::DeletePrevChar);
        }
    }

    /// Handles the device's terminator by delivering the buffer as a change
    /// notification.
    pub fn commit(&mut self, now: Instant) -> Option<ScanEvent> {
        if !self.focused {
            return None;
        }
        let value = self.input.value().to_string();
        self.on_change(&value, now)
    }

    /// Processes a change notification carrying the full input value.
    ///
    /// Whitespace-only values are dropped without touching any state.
    /// Otherwise exactly one [`ScanEvent`] is returned, the buffer is
    /// cleared and a refocus is scheduled.
    pub fn on_change(&mut self, value: &str, now: Instant) -> Option<ScanEvent> {
        let code = value.trim();
        if code.is_empty() {
            return None;
        }

        let event = ScanEvent::new(code);
        self.input.reset();
        self.schedule_refocus(now);
        log::debug!("Captured scan {}", event.code);
        Some(event)
    }

    /// Feeds a bracketed paste.
    ///
    /// Scanners configured for paste mode deliver whole codes at once. Each
    /// line terminated by `\n` or `\r` is committed; a trailing fragment
    /// stays in the buffer for the next keystrokes.
    pub fn paste(&mut self, text: &str, now: Instant) -> Vec<ScanEvent> {
        if !self.focused {
            return Vec::new();
        }

        let mut events = Vec::new();
        for c in text.chars() {
            match c {
                '\n' | '\r' => events.extend(self.commit(now)),
                c => {
                    self.insert_char(c);
                }
            }
        }
        events
    }

    /// Gives the capture focus.
    ///
    /// Returns `true` when focus was actually gained, i.e. a focus event
    /// fires. Focusing an already focused capture is a no-op.
    pub fn focus(&mut self) -> bool {
        let gained = !self.focused;
        self.focused = true;
        gained
    }

    /// Takes focus away (the terminal window lost focus).
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// A pointer click anywhere pulls focus back to the capture.
    pub fn on_pointer_click(&mut self) -> bool {
        self.focus()
    }

    /// Schedules a refocus `refocus_delay` after `now`.
    ///
    /// A later call replaces the pending deadline.
    pub fn schedule_refocus(&mut self, now: Instant) {
        self.refocus_at = Some(now + self.refocus_delay);
    }

    /// Pending refocus deadline.
    pub fn refocus_deadline(&self) -> Option<Instant> {
        self.refocus_at
    }

    /// Fires the scheduled refocus once its deadline has passed.
    ///
    /// Returns `true` exactly once per scheduled refocus. The capture is
    /// focused afterwards regardless of its previous state.
    pub fn poll_refocus(&mut self, now: Instant) -> bool {
        match self.refocus_at {
            Some(at) if now >= at => {
                self.refocus_at = None;
                self.focused = true;
                true
            }
            _ => false,
        }
    }
}

impl Default for ScanCapture {
    fn default() -> Self {
        Self::new(crate::constants::REFOCUS_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focused_capture() -> ScanCapture {
        let mut capture = ScanCapture::new(Duration::from_millis(100));
        capture.focus();
        capture
    }

    fn type_code(capture: &mut ScanCapture, code: &str) {
        for c in code.chars() {
            capture.insert_char(c);
        }
    }

    #[test]
    fn test_whitespace_change_is_dropped() {
        let mut capture = focused_capture();
        let now = Instant::now();
        for value in ["", " ", "\t \n", "   "] {
            assert!(capture.on_change(value, now).is_none());
        }
        assert!(capture.refocus_deadline().is_none());
    }

    #[test]
    fn test_commit_of_whitespace_buffer_changes_nothing() {
        let mut capture = focused_capture();
        type_code(&mut capture, "  ");
        assert!(capture.commit(Instant::now()).is_none());
        assert_eq!(capture.value(), "  ");
        assert!(capture.refocus_deadline().is_none());
    }

    #[test]
    fn test_change_emits_one_trimmed_event() {
        let mut capture = focused_capture();
        let event = capture.on_change(" 789123 ", Instant::now()).unwrap();
        assert_eq!(event.code, "789123");
    }

    #[test]
    fn test_commit_clears_buffer_and_schedules_refocus() {
        let mut capture = focused_capture();
        let now = Instant::now();
        type_code(&mut capture, "789123");
        assert_eq!(capture.value(), "789123");

        let event = capture.commit(now).unwrap();
        assert_eq!(event.code, "789123");
        assert_eq!(capture.value(), "");
        assert_eq!(capture.refocus_deadline(), Some(now + Duration::from_millis(100)));
    }

    #[test]
    fn test_same_code_twice_is_two_scans() {
        let mut capture = focused_capture();
        let now = Instant::now();
        type_code(&mut capture, "555");
        let first = capture.commit(now);
        type_code(&mut capture, "555");
        let second = capture.commit(now);
        assert_eq!(first.map(|e| e.code), Some("555".to_string()));
        assert_eq!(second.map(|e| e.code), Some("555".to_string()));
    }

    #[test]
    fn test_unfocused_capture_drops_keystrokes() {
        let mut capture = ScanCapture::new(Duration::from_millis(100));
        assert!(!capture.insert_char('1'));
        assert!(capture.commit(Instant::now()).is_none());
        assert!(capture.paste("123\n", Instant::now()).is_empty());
        assert_eq!(capture.value(), "");
    }

    #[test]
    fn test_backspace_edits_buffer() {
        let mut capture = focused_capture();
        type_code(&mut capture, "1234");
        capture.delete_char();
        assert_eq!(capture.value(), "123");
    }

    #[test]
    fn test_paste_commits_each_line_and_keeps_fragment() {
        let mut capture = focused_capture();
        let events = capture.paste("111\r\n222\n33", Instant::now());
        let codes: Vec<_> = events.into_iter().map(|e| e.code).collect();
        assert_eq!(codes, vec!["111", "222"]);
        assert_eq!(capture.value(), "33");
    }

    #[test]
    fn test_pointer_click_refocuses() {
        let mut capture = focused_capture();
        capture.blur();
        assert!(!capture.is_focused());
        assert!(capture.on_pointer_click());
        assert!(capture.is_focused());
        // Clicking again does not fire another focus event
        assert!(!capture.on_pointer_click());
    }

    #[test]
    fn test_refocus_fires_once_after_delay() {
        let mut capture = focused_capture();
        let now = Instant::now();
        capture.on_change("42", now).unwrap();
        capture.blur();

        assert!(!capture.poll_refocus(now + Duration::from_millis(50)));
        assert!(capture.poll_refocus(now + Duration::from_millis(100)));
        assert!(capture.is_focused());
        assert!(!capture.poll_refocus(now + Duration::from_millis(200)));
    }
}
