//! Application core: scan capture wired to the lookup dispatcher.
//!
//! [`App`] owns one [`ScanCapture`] and one [`Dispatcher`] and is driven by
//! a single event loop (TUI or headless). The loop feeds it
//! [`AppAction`]s and calls [`App::tick`] regularly to apply lookup
//! settlements and fire capture refocus deadlines.
//!
//! # Flow
//!
//! ```text
//! AppAction ──► ScanCapture ──ScanEvent──► Dispatcher ──spawn──► lookup task
//!                    ▲                         ▲                     │
//!                    │ refocus                 │ settle              │
//!                    └────────── tick() ◄──────┴─── LookupSettled ◄──┘
//! ```
//!
//! The capture never reads session state; focus gains are forwarded to
//! the dispatcher as "awaiting scan".

pub mod input;

use std::sync::Arc;
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::capture::ScanCapture;
use crate::config::Config;
use crate::constants;
use crate::dispatch::{Dispatcher, LookupSettled, PresentationSink};
use crate::lookup::TributeLookup;

pub use input::{event_to_action, AppAction};

/// Scan capture plus dispatcher, driven by one event loop.
#[derive(Debug)]
pub struct App {
    capture: ScanCapture,
    dispatcher: Dispatcher,
    settled_rx: UnboundedReceiver<LookupSettled>,
    quit: bool,
}

impl App {
    /// Creates the app with an unfocused capture and an idle session.
    ///
    /// Call [`App::start`] once the host is ready to receive keystrokes.
    pub fn new(
        config: &Config,
        lookup: Arc<dyn TributeLookup>,
        sink: Box<dyn PresentationSink>,
        runtime: Handle,
    ) -> Self {
        let (dispatcher, settled_rx) = Dispatcher::new(lookup, sink, runtime);
        Self {
            capture: ScanCapture::new(config.refocus_delay()),
            dispatcher,
            settled_rx,
            quit: false,
        }
    }

    /// Focuses the capture for the first time, entering `Scanning`.
    pub fn start(&mut self) {
        if self.capture.focus() {
            self.dispatcher.rescan();
        }
    }

    /// The scan capture.
    pub fn capture(&self) -> &ScanCapture {
        &self.capture
    }

    /// The lookup dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Whether the operator asked to quit.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Applies one action.
    pub fn handle_action(&mut self, action: AppAction, now: Instant) {
        match action {
            AppAction::InsertChar(c) => {
                if !self.capture.insert_char(c) {
                    log::debug!("Dropped keystroke while capture is unfocused");
                }
            }
            AppAction::DeleteChar => self.capture.delete_char(),
            AppAction::Commit => {
                if let Some(event) = self.capture.commit(now) {
                    self.dispatcher.scan(event);
                }
            }
            AppAction::Paste(text) => {
                for event in self.capture.paste(&text, now) {
                    self.dispatcher.scan(event);
                }
            }
            AppAction::Submit(value) => {
                if let Some(event) = self.capture.on_change(&value, now) {
                    self.dispatcher.scan(event);
                }
            }
            AppAction::PointerClick => {
                if self.capture.on_pointer_click() {
                    self.dispatcher.rescan();
                }
            }
            AppAction::FocusGained => {
                if self.capture.focus() {
                    self.dispatcher.rescan();
                }
            }
            AppAction::FocusLost => self.capture.blur(),
            AppAction::Dismiss => {
                if self.dispatcher.dismiss() {
                    self.capture.schedule_refocus(now);
                }
            }
            AppAction::Rescan => {
                self.capture.focus();
                self.dispatcher.rescan();
            }
            AppAction::Quit => self.quit = true,
        }
    }

    /// Applies pending lookup settlements and fires a due refocus.
    ///
    /// Returns the number of settlements received (applied or discarded).
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut received = 0;
        while received < constants::MAX_SETTLEMENTS_PER_TICK {
            match self.settled_rx.try_recv() {
                Ok(settled) => {
                    self.dispatcher.settle(settled);
                    received += 1;
                }
                Err(_) => break,
            }
        }

        if self.capture.poll_refocus(now) {
            self.dispatcher.rescan();
        }

        received
    }
}
