/// Unit-of-work state definitions for tracking crawl progress
///
/// This module defines every state a single crawl unit (one URL at one depth)
/// passes through, and which transitions between them are legal.
use std::fmt;

/// Represents the current state of a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    // ===== Active States =====
    /// Unit has been announced to the tracker and spawned
    Scheduled,

    /// Unit is running; the fetch may or may not be issued
    Fetching,

    // ===== Outcome States =====
    /// Page was fetched and its links were fanned out
    Succeeded,

    /// Page fetch failed; a failure report was emitted
    Failed,

    // ===== Final State =====
    /// Unit has resolved itself on the completion tracker
    Terminated,
}

impl UnitState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// `Fetching -> Terminated` is the path taken when the depth budget is
    /// exhausted and no fetch is issued.
    pub fn can_transition_to(&self, next: UnitState) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Fetching)
                | (Self::Fetching, Self::Succeeded)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetching, Self::Terminated)
                | (Self::Succeeded, Self::Terminated)
                | (Self::Failed, Self::Terminated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Fetching => "fetching",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
