//! Tribute scanner - barcode scan to tax attribute lookup.
//!
//! A hardware barcode scanner emulating a keyboard types a product code
//! followed by Enter. This crate turns that keystroke stream into discrete
//! scans, looks up the tax attributes (ICMS, PIS, COFINS, NCM, CFOP, ...) for
//! each, and shows the result to the operator.
//!
//! # Architecture
//!
//! ```text
//! terminal / stdin ──► ScanCapture ──ScanEvent──► Dispatcher ──► TributeLookup
//!                                                     │
//!                                                     ▼
//!                                           PresentationSink (TUI / JSON lines)
//! ```
//!
//! - **Capture** - keystroke buffer, empty-scan filtering, refocus
//! - **Dispatch** - session state machine, last scan wins
//! - **Lookup** - HTTP API, simulated data, or a local catalog
//! - **TUI / headless** - operator surfaces driving the same [`App`]
//!
//! # Modules
//!
//! - [`app`] - Capture and dispatcher composition, input actions
//! - [`capture`] - Scan capture
//! - [`dispatch`] - Lookup dispatcher and presentation sinks
//! - [`lookup`] - Lookup collaborators
//! - [`record`] - Scan events and tribute records
//! - [`config`] - Configuration loading/saving

// Library modules
pub mod app;
pub mod capture;
pub mod commands;
pub mod dispatch;
pub mod headless;
pub mod lookup;
pub mod record;
pub mod tui;

pub mod config;
pub mod constants;
pub mod env;

// Re-export commonly used types
pub use app::{App, AppAction};
pub use capture::ScanCapture;
pub use config::{Config, LookupSource};
pub use dispatch::{
    Dispatcher, JsonLinesSink, LookupSettled, PresentationSink, ScanId, SessionState, SessionView,
    SharedView,
};
pub use lookup::{CatalogLookup, HttpLookup, SimulatedLookup, TributeLookup};
pub use record::{FieldValue, RecordShape, ScanEvent, TributeRecord};
