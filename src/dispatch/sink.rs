//! Presentation sinks.
//!
//! The dispatcher pushes a [`SessionView`] to its sink on every state
//! transition. The TUI keeps only the latest view and draws it each frame;
//! headless mode writes one JSON line per transition.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use super::state::SessionView;

/// Receiver of session snapshots.
pub trait PresentationSink {
    /// Called after every dispatcher state transition.
    fn render(&mut self, view: &SessionView);
}

/// Keeps the most recent view for a renderer to read.
///
/// Cloning shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    latest: Arc<Mutex<SessionView>>,
}

impl SharedView {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recent view.
    pub fn snapshot(&self) -> SessionView {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PresentationSink for SharedView {
    fn render(&mut self, view: &SessionView) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = view.clone();
    }
}

/// Writes each view as a JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLinesSink<std::io::Stdout> {
    /// Sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> PresentationSink for JsonLinesSink<W> {
    fn render(&mut self, view: &SessionView) {
        let written = serde_json::to_writer(&mut self.out, view)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            log::error!("Failed to write session view: {}", e);
        }
    }
}
