//! Lookup dispatcher: one lookup per scan, last scan wins.
//!
//! The [`Dispatcher`] owns the [`SessionState`] machine. Each scan gets a
//! fresh [`ScanId`] and spawns its lookup on the tokio runtime; the task
//! reports back through an mpsc channel as a [`LookupSettled`], which the
//! event loop feeds to [`Dispatcher::settle`].
//!
//! # Stale-result suppression
//!
//! Lookups may settle in any order. A settlement is applied only if its
//! `ScanId` is still the latest issued one and the session is still
//! resolving it; anything else belongs to a superseded scan and is dropped.
//! Superseded lookups are not cancelled, they simply run to completion.
//!
//! ```text
//! scan(111) ──► #1 spawned ─────────────────────────► settles late: dropped
//! scan(222) ──► #2 spawned ──► settles ──► Displaying(222)
//! ```

pub mod sink;
pub mod state;

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::lookup::{self, TributeLookup};
use crate::record::{ScanEvent, TributeRecord};

pub use sink::{JsonLinesSink, PresentationSink, SharedView};
pub use state::{ScanId, SessionState, SessionView};

/// Outcome of a lookup task, delivered back to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettled {
    /// Scan the lookup was issued for.
    pub scan: ScanId,
    /// Code that was looked up.
    pub code: String,
    /// Normalized result; `None` for both misses and failures.
    pub record: Option<TributeRecord>,
}

/// Drives the scan session state machine.
pub struct Dispatcher {
    lookup: Arc<dyn TributeLookup>,
    runtime: Handle,
    settled_tx: UnboundedSender<LookupSettled>,
    sink: Box<dyn PresentationSink>,
    state: SessionState,
    /// "Awaiting scan" indicator shown to the operator.
    awaiting_scan: bool,
    /// Last issued scan identity.
    latest: Option<ScanId>,
    next_scan: u64,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("lookup", &self.lookup.name())
            .field("state", &self.state)
            .field("awaiting_scan", &self.awaiting_scan)
            .field("latest", &self.latest)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher in [`SessionState::Idle`].
    ///
    /// Returns the receiver on which lookup settlements arrive; the caller's
    /// event loop must pass each one to [`Dispatcher::settle`].
    ///
    /// # Arguments
    ///
    /// * `lookup` - Collaborator used for every scan
    /// * `sink` - Presentation sink notified on every transition
    /// * `runtime` - Runtime the lookup tasks are spawned on
    pub fn new(
        lookup: Arc<dyn TributeLookup>,
        sink: Box<dyn PresentationSink>,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<LookupSettled>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            lookup,
            runtime,
            settled_tx,
            sink,
            state: SessionState::Idle,
            awaiting_scan: false,
            latest: None,
            next_scan: 1,
        };
        (dispatcher, settled_rx)
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Snapshot of what the operator should see.
    pub fn view(&self) -> SessionView {
        SessionView::from_state(&self.state, self.awaiting_scan)
    }

    /// Identity of the most recently issued scan.
    pub fn latest_scan(&self) -> Option<ScanId> {
        self.latest
    }

    /// Whether a lookup for the latest scan is still outstanding.
    pub fn is_resolving(&self) -> bool {
        matches!(self.state, SessionState::Resolving { .. })
    }

    /// Starts resolving a scanned code, superseding anything in flight or
    /// on display.
    pub fn scan(&mut self, event: ScanEvent) -> ScanId {
        let scan = ScanId(self.next_scan);
        self.next_scan += 1;

        if let Some(previous) = self.latest {
            if self.is_resolving() {
                log::debug!("Scan {} supersedes in-flight scan {}", scan, previous);
            }
        }

        log::info!(
            "Scan {}: {} at {}",
            scan,
            event.code,
            event.scanned_at.format("%H:%M:%S%.3f")
        );
        self.latest = Some(scan);
        self.awaiting_scan = false;
        self.state = SessionState::Resolving {
            scan,
            code: event.code.clone(),
        };
        self.publish();

        let lookup = Arc::clone(&self.lookup);
        let tx = self.settled_tx.clone();
        let code = event.code;
        self.runtime.spawn(async move {
            let record = lookup::resolve(lookup.as_ref(), &code).await;
            // The receiver is gone only when the app is shutting down.
            let _ = tx.send(LookupSettled { scan, code, record });
        });

        scan
    }

    /// Applies a lookup settlement.
    ///
    /// Returns `true` if it was applied, `false` if it belonged to a
    /// superseded scan and was discarded.
    pub fn settle(&mut self, settled: LookupSettled) -> bool {
        let current = match &self.state {
            SessionState::Resolving { scan, .. } => Some(*scan),
            _ => None,
        };
        if self.latest != Some(settled.scan) || current != Some(settled.scan) {
            log::debug!(
                "Discarding stale result for scan {} ({})",
                settled.scan,
                settled.code
            );
            return false;
        }

        self.state = SessionState::Displaying {
            scan: settled.scan,
            code: settled.code,
            record: settled.record,
        };
        self.publish();
        true
    }

    /// Closes the result dialog and returns to waiting for a scan.
    ///
    /// Returns `false` (and does nothing) unless a result is displayed.
    pub fn dismiss(&mut self) -> bool {
        if !matches!(self.state, SessionState::Displaying { .. }) {
            return false;
        }
        self.state = SessionState::Scanning;
        self.awaiting_scan = true;
        self.publish();
        true
    }

    /// Turns the "awaiting scan" indicator on without a new code.
    ///
    /// Leaves `Idle` for `Scanning`; any other state is kept.
    pub fn rescan(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Scanning;
        }
        self.awaiting_scan = true;
        self.publish();
    }

    fn publish(&mut self) {
        let view = self.view();
        log::trace!("Session {} -> {:?}", self.state.display_name(), view);
        self.sink.render(&view);
    }
}
