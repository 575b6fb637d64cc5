//! Per-site audit lifecycle
//!
//! Each configured site moves through these states once per run:
//!
//! ```text
//! Pending ──► Skipped                                  (target already met)
//!    │
//!    └──► Discovering ──► Auditing ◄──► Persisting
//!              │             │              │
//!              └─────────────┴──────────────┴──► Done
//! ```

use std::fmt;

/// Represents where a site is in the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Site has not been looked at yet
    Pending,

    /// Site already has enough audited pages
    Skipped,

    /// Candidate pages are being discovered
    Discovering,

    /// A candidate page is being audited
    Auditing,

    /// An audit record is being written
    Persisting,

    /// All candidates have been handled
    Done,
}

impl SiteState {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skipped | Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: SiteState) -> bool {
        use SiteState::*;

        matches!(
            (self, next),
            (Pending, Skipped)
                | (Pending, Discovering)
                | (Discovering, Auditing)
                | (Discovering, Done)
                | (Auditing, Auditing)
                | (Auditing, Persisting)
                | (Auditing, Done)
                | (Persisting, Auditing)
                | (Persisting, Done)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn advance(self, next: SiteState) -> Result<SiteState, crate::AuditError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(crate::AuditError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Skipped => "skipped",
            Self::Discovering => "discovering",
            Self::Auditing => "auditing",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
