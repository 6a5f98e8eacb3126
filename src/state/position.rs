//! Listing position as reported by the rendered page
use std::fmt;

/// Current and total page numbers read from the position indicator
///
/// Both values are at least 1. A missing position (the indicator could not be
/// read) is represented as `Option::None` by callers, never as a zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PagePosition {
    pub current: u32,
    pub total: u32,
}

impl PagePosition {
    /// Builds a position, rejecting zero page numbers
    pub fn new(current: u32, total: u32) -> Option<Self> {
        if current == 0 || total == 0 {
            return None;
        }
        Some(Self { current, total })
    }

    /// Returns true once the listing reports no further pages
    pub fn is_last(&self) -> bool {
        self.current >= self.total
    }

    /// Pages still ahead of the current one
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.current)
    }
}

impl fmt::Display for PagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}
