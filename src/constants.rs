//! Application-wide constants for tribute-scanner.
//!
//! This module centralizes timing and layout constants so the capture,
//! dispatch and rendering layers agree on them. Constants are grouped by
//! domain.
//!
//! # Categories
//!
//! - **Timeouts**: Network timeouts for lookup collaborators
//! - **Capture**: Scan capture focus timing
//! - **Event loop**: Tick and poll intervals
//! - **UI**: Layout percentages

use std::time::Duration;

// ============================================================================
// Timeouts
// ============================================================================

/// Default HTTP request timeout for the tribute lookup API.
///
/// The dispatcher imposes no timeout of its own; this bounds how long a
/// single HTTP lookup may hang before it settles as a failure.
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Capture
// ============================================================================

/// Delay between a committed scan and the capture refocus.
///
/// Refocus is deferred rather than immediate so it never races the event
/// that produced the scan.
pub const REFOCUS_DELAY: Duration = Duration::from_millis(100);

// ============================================================================
// Event loop
// ============================================================================

/// TUI frame rate delay (approximately 60fps).
pub const FRAME_RATE_DELAY: Duration = Duration::from_millis(16);

/// How long the TUI waits for a terminal event on each tick.
pub const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Headless loop sleep between ticks.
pub const HEADLESS_TICK: Duration = Duration::from_millis(16);

/// Maximum lookup settlements applied per tick.
///
/// Keeps a burst of settlements from starving input handling.
pub const MAX_SETTLEMENTS_PER_TICK: usize = 100;

// ============================================================================
// UI
// ============================================================================

/// Result dialog width as a percentage of the terminal width.
pub const RESULT_DIALOG_WIDTH_PERCENT: u16 = 60;

/// Result dialog height as a percentage of the terminal height.
pub const RESULT_DIALOG_HEIGHT_PERCENT: u16 = 70;

/// Number of code characters used in a simulated product name.
pub const SIMULATED_NAME_PREFIX_LEN: usize = 8;
