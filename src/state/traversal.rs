/// Traversal state definitions for the pagination controller
///
/// This module defines the states one listing traversal moves through and
/// the reasons it can stop.
use std::fmt;

/// Represents the current state of a listing traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalState {
    // ===== Active States =====
    /// The listing has not been loaded yet
    Start,

    /// Reading the position and harvesting links from the current page
    Harvesting,

    /// Triggering the next-page control
    Advancing,

    // ===== Terminal States =====
    /// The traversal reached a clean end
    Done,

    /// Advancing failed while pages were believed to remain
    Aborted,

    /// An operator interrupt was observed between pages
    Interrupted,
}

impl TraversalState {
    /// Returns true if the traversal loop has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Interrupted)
    }

    /// Returns true only for a clean completion
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Harvesting => "harvesting",
            Self::Advancing => "advancing",
            Self::Done => "done",
            Self::Aborted => "aborted",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a traversal stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The position indicator reported `current >= total`
    LastPage,

    /// The next-page control was present but disabled
    ControlDisabled,

    /// The configured page ceiling was reached
    SafetyCeiling,

    /// Advancing failed after the extended retry while pages remained
    NavigationExhausted,

    /// Advancing failed and the position could not be read
    PositionUnknown,

    /// Operator interrupt
    Interrupted,
}

impl Termination {
    /// The terminal state this reason leads to
    pub fn state(&self) -> TraversalState {
        match self {
            Self::LastPage | Self::ControlDisabled | Self::SafetyCeiling => TraversalState::Done,
            Self::NavigationExhausted | Self::PositionUnknown => TraversalState::Aborted,
            Self::Interrupted => TraversalState::Interrupted,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::LastPage => "reached the last page",
            Self::ControlDisabled => "next-page control is disabled",
            Self::SafetyCeiling => "page ceiling reached",
            Self::NavigationExhausted => "could not advance although pages remain",
            Self::PositionUnknown => "could not advance and position is unknown",
            Self::Interrupted => "interrupted by operator",
        };
        f.write_str(text)
    }
}
