//! TUI - Terminal User Interface.
//!
//! The terminal is the keyboard sink a USB scanner types into. This module
//! owns terminal setup/teardown, rendering of [`SessionView`] snapshots, and
//! the event loop that feeds terminal events to the [`App`].
//!
//! # Architecture
//!
//! ```text
//! TuiRunner (main thread)
//! ├── terminal: Terminal<B>        - ratatui terminal
//! ├── app: App                     - capture + dispatcher
//! ├── view: SharedView             - latest snapshot from the dispatcher
//! └── shutdown: Arc<AtomicBool>    - signal-triggered exit
//! ```
//!
//! # Modules
//!
//! - [`guard`] - Terminal state RAII guard for cleanup
//! - [`render`] - Scanner screen and result dialog
//! - [`runner`] - TuiRunner struct and event loop
//!
//! [`SessionView`]: crate::dispatch::SessionView
//! [`App`]: crate::app::App

// Rust guideline compliant 2026-02

pub mod guard;
pub mod render;
pub mod runner;

#[doc(inline)]
pub use guard::TerminalGuard;
#[doc(inline)]
pub use render::{render, RenderContext};
#[doc(inline)]
pub use runner::TuiRunner;
