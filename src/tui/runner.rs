//! TUI Runner - the interactive event loop.
//!
//! The runner owns the ratatui terminal and the [`App`]. Each iteration:
//! 1. Polls for keyboard/mouse/focus/paste input
//! 2. Ticks the app (applies lookup settlements, fires refocus)
//! 3. Renders the latest [`SessionView`] from the shared sink slot
//!
//! Lookups run on the tokio runtime; the loop itself never blocks on them.
//!
//! [`SessionView`]: crate::dispatch::SessionView

// Rust guideline compliant 2026-01

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::backend::Backend;
use ratatui::Terminal;

use crate::app::{event_to_action, App};
use crate::constants;
use crate::dispatch::SharedView;

use super::render::{render, RenderContext};

/// Owns the terminal and drives the app until quit or shutdown.
///
/// The `B` type parameter is the ratatui backend type. For production use,
/// this is `CrosstermBackend<Stdout>`. For testing, `TestBackend` can be used.
pub struct TuiRunner<B: Backend> {
    terminal: Terminal<B>,
    app: App,
    /// Slot the dispatcher publishes into; read once per frame.
    view: SharedView,
    /// Shutdown flag set by signal handlers.
    shutdown: Arc<AtomicBool>,
}

impl<B: Backend> std::fmt::Debug for TuiRunner<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TuiRunner")
            .field("app", &self.app)
            .field("shutdown", &self.shutdown.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<B> TuiRunner<B>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    /// Create a new TuiRunner.
    ///
    /// # Arguments
    ///
    /// * `terminal` - Ratatui terminal to draw on
    /// * `app` - App whose dispatcher publishes into `view`
    /// * `view` - Shared sink slot read on every frame
    /// * `shutdown` - Shared shutdown flag
    pub fn new(terminal: Terminal<B>, app: App, view: SharedView, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            terminal,
            app,
            view,
            shutdown,
        }
    }

    /// The app being driven.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Check if the runner should quit.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.app.should_quit() || self.shutdown.load(Ordering::SeqCst)
    }

    /// Run the TUI event loop.
    ///
    /// Blocks until the operator quits or a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        log::info!("TuiRunner event loop starting");
        self.app.start();

        while !self.should_quit() {
            self.poll_input()?;

            if self.should_quit() {
                break;
            }

            self.app.tick(Instant::now());
            self.render()?;

            // Small sleep to prevent CPU spinning (60 FPS max)
            std::thread::sleep(constants::FRAME_RATE_DELAY);
        }

        log::info!("TuiRunner event loop exiting");
        Ok(())
    }

    /// Poll for terminal input and handle it.
    fn poll_input(&mut self) -> Result<()> {
        if event::poll(constants::INPUT_POLL_TIMEOUT)? {
            let ev = event::read()?;
            self.handle_event(&ev, Instant::now());
        }
        Ok(())
    }

    /// Handle one terminal event.
    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        if let Some(action) = event_to_action(event) {
            log::trace!("Input {:?}", action);
            self.app.handle_action(action, now);
        }
    }

    /// Draw the current view.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to draw.
    pub fn render(&mut self) -> Result<()> {
        let view = self.view.snapshot();
        let capture = self.app.capture();
        let ctx = RenderContext {
            view: &view,
            input: capture.value(),
            focused: capture.is_focused(),
        };
        self.terminal.draw(|f| render(f, &ctx))?;
        Ok(())
    }

    /// The terminal, for inspecting test backends.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::lookup::CatalogLookup;
    use crate::record::{FieldValue, TributeRecord};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::time::Duration;
    use tokio::runtime::Handle;

    fn create_test_runner() -> TuiRunner<TestBackend> {
        let terminal = Terminal::new(TestBackend::new(80, 24)).expect("Failed to create test terminal");
        let view = SharedView::new();
        let lookup = Arc::new(CatalogLookup::from_records([
            TributeRecord::new("789").with_field("icms", FieldValue::Number(18.5))
        ]));
        let mut app = App::new(&Config::default(), lookup, Box::new(view.clone()), Handle::current());
        app.start();
        TuiRunner::new(terminal, app, view, Arc::new(AtomicBool::new(false)))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen(runner: &TuiRunner<TestBackend>) -> String {
        let buffer = runner.terminal().backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[tokio::test]
    async fn test_scan_dismiss_cycle_through_terminal_events() {
        let mut runner = create_test_runner();
        let now = Instant::now();

        for c in "789".chars() {
            runner.handle_event(&key(KeyCode::Char(c)), now);
        }
        runner.render().unwrap();
        assert!(screen(&runner).contains("> 789"));

        runner.handle_event(&key(KeyCode::Enter), now);
        tokio::time::sleep(Duration::from_millis(5)).await;
        runner.app.tick(now);
        runner.render().unwrap();
        assert!(screen(&runner).contains("ICMS: 18.5%"));

        runner.handle_event(&key(KeyCode::Esc), now);
        runner.render().unwrap();
        let text = screen(&runner);
        assert!(!text.contains("Tributos"));
        assert!(text.contains("Aguardando leitura..."));
    }

    #[tokio::test]
    async fn test_quit_keys_and_shutdown_flag() {
        let mut runner = create_test_runner();
        assert!(!runner.should_quit());
        runner.handle_event(
            &Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Instant::now(),
        );
        assert!(runner.should_quit());

        let runner = create_test_runner();
        runner.shutdown.store(true, Ordering::SeqCst);
        assert!(runner.should_quit());
    }
}
