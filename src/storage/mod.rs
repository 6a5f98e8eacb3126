//! Storage module for persisting harvest and capture progress
//!
//! This module owns the checkpoint ledger, including:
//! - The delimited file format and key normalization
//! - Create-if-absent appends for harvested links
//! - Monotonic completion updates with atomic file replacement
//! - Restartable scans and summary statistics

mod error;
mod ledger;
mod row;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{CheckpointLedger, LedgerScan};
pub use row::{normalize_key, HEADER};

/// One ledger entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Normalized link; the record's natural key
    pub url: String,
    /// Whether a capture artifact has been produced
    pub done: bool,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>, done: bool) -> Self {
        Self {
            url: url.into(),
            done,
        }
    }
}

/// Ledger totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub total: u64,
    pub completed: u64,
}

impl LedgerStats {
    pub fn pending(&self) -> u64 {
        self.total - self.completed
    }
}
