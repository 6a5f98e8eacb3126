//! Statistics generation from the checkpoint ledger
//!
//! This module provides functionality for extracting and displaying
//! harvest and capture progress from the ledger file.

use crate::storage::{CheckpointLedger, LedgerStats};
use crate::FolioError;

/// Ledger progress summary
#[derive(Debug, Clone)]
pub struct LedgerStatistics {
    /// Ledger file the counts were read from
    pub path: String,

    /// Total, completed and pending record counts
    pub counts: LedgerStats,

    /// First record still waiting for a capture
    pub next_pending: Option<String>,
}

impl LedgerStatistics {
    /// Share of records with an artifact, in percent
    pub fn completion_rate(&self) -> f64 {
        if self.counts.total > 0 {
            (self.counts.completed as f64 / self.counts.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Loads statistics from the ledger
///
/// # Arguments
///
/// * `ledger` - The ledger to read
///
/// # Returns
///
/// * `Ok(LedgerStatistics)` - Successfully loaded statistics
/// * `Err(FolioError)` - The ledger is missing or unreadable
pub fn load_statistics(ledger: &CheckpointLedger) -> Result<LedgerStatistics, FolioError> {
    let counts = ledger.stats()?;
    let next_pending = ledger.next_pending(None)?.map(|record| record.url);

    Ok(LedgerStatistics {
        path: ledger.path().display().to_string(),
        counts,
        next_pending,
    })
}

/// Formats statistics for the terminal
pub fn format_statistics(stats: &LedgerStatistics) -> String {
    let mut out = String::new();
    out.push_str("=== Ledger Statistics ===\n\n");
    out.push_str(&format!("Ledger: {}\n\n", stats.path));

    out.push_str("Records:\n");
    out.push_str(&format!("  Total links: {}\n", stats.counts.total));
    out.push_str(&format!("  Captured: {}\n", stats.counts.completed));
    out.push_str(&format!("  Pending: {}\n\n", stats.counts.pending()));

    if let Some(url) = &stats.next_pending {
        out.push_str(&format!("Next pending: {}\n\n", url));
    }

    out.push_str(&format!(
        "Completion: {:.1}% ({} / {} links captured)\n",
        stats.completion_rate(),
        stats.counts.completed,
        stats.counts.total
    ));
    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &LedgerStatistics) {
    print!("{}", format_statistics(stats));
}
