//! Scan session state types.
//!
//! [`SessionState`] is the dispatcher's finite-state machine. It is never
//! handed out mutably; presentation receives [`SessionView`] snapshots.
//!
//! ```text
//! Idle ──focus──► Scanning ──scan──► Resolving ──settle──► Displaying
//!                    ▲                  ▲  │                  │  │
//!                    │                  └──┘ scan             │  │
//!                    │                  ▲                     │  │
//!                    │                  └────── scan ─────────┘  │
//!                    └──────────────── dismiss ──────────────────┘
//! ```

use serde::Serialize;

use crate::record::TributeRecord;

/// Identity of one issued scan.
///
/// Assigned from a monotonic counter, so two scans of the same code still
/// have distinct identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScanId(pub u64);

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of the current scan session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No code yet and the capture has not been focused.
    #[default]
    Idle,
    /// Waiting for the next code.
    Scanning,
    /// Lookup in flight for the latest scan.
    Resolving {
        /// Scan being resolved.
        scan: ScanId,
        /// Code being looked up.
        code: String,
    },
    /// Result shown to the operator; `record` is `None` when not found.
    Displaying {
        /// Scan whose result is shown.
        scan: ScanId,
        /// Code that was looked up.
        code: String,
        /// Lookup result.
        record: Option<TributeRecord>,
    },
}

impl SessionState {
    /// Returns a human-readable name for the state.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Scanning => "Scanning",
            Self::Resolving { .. } => "Resolving",
            Self::Displaying { .. } => "Displaying",
        }
    }

    /// Code associated with the state, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Resolving { code, .. } | Self::Displaying { code, .. } => Some(code),
            Self::Idle | Self::Scanning => None,
        }
    }
}

/// Snapshot delivered to the presentation sink on every transition.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SessionView {
    /// Whether the "awaiting scan" indicator is on.
    pub scanning: bool,
    /// Code of the current or last scan.
    pub code: Option<String>,
    /// Record to display; `None` while resolving or when not found.
    pub record: Option<TributeRecord>,
    /// Whether the result dialog is open.
    pub show_result: bool,
}

impl SessionView {
    /// Builds the view for `state` with the given indicator.
    pub fn from_state(state: &SessionState, scanning: bool) -> Self {
        match state {
            SessionState::Idle | SessionState::Scanning => Self {
                scanning,
                ..Self::default()
            },
            SessionState::Resolving { code, .. } => Self {
                scanning,
                code: Some(code.clone()),
                ..Self::default()
            },
            SessionState::Displaying { code, record, .. } => Self {
                scanning,
                code: Some(code.clone()),
                record: record.clone(),
                show_result: true,
            },
        }
    }

    /// Whether the open dialog shows a miss.
    pub fn is_not_found(&self) -> bool {
        self.show_result && self.record.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
        assert_eq!(SessionState::Idle.display_name(), "Idle");
    }

    #[test]
    fn test_state_code() {
        let resolving = SessionState::Resolving {
            scan: ScanId(1),
            code: "111".into(),
        };
        assert_eq!(resolving.code(), Some("111"));
        assert_eq!(SessionState::Scanning.code(), None);
    }

    #[test]
    fn test_view_for_displaying_miss() {
        let state = SessionState::Displaying {
            scan: ScanId(3),
            code: "404".into(),
            record: None,
        };
        let view = SessionView::from_state(&state, false);
        assert!(view.show_result);
        assert!(view.is_not_found());
        assert_eq!(view.code.as_deref(), Some("404"));
    }

    #[test]
    fn test_view_for_resolving_hides_result() {
        let state = SessionState::Resolving {
            scan: ScanId(2),
            code: "111".into(),
        };
        let view = SessionView::from_state(&state, false);
        assert!(!view.show_result);
        assert!(!view.is_not_found());
        assert!(view.record.is_none());
    }

    #[test]
    fn test_scan_id_display() {
        assert_eq!(ScanId(7).to_string(), "#7");
    }
}
