//! Output module for operator-facing summaries
//!
//! This module handles:
//! - Ledger progress statistics (`--stats`)
//! - End-of-run summaries for the traversal and the capture job

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, LedgerStatistics};

use crate::capture::JobReport;
use crate::crawler::TraversalReport;

/// Formats the end-of-traversal summary
pub fn format_traversal_report(report: &TraversalReport) -> String {
    let position = report
        .last_position
        .map_or_else(|| "unknown".to_string(), |p| p.to_string());

    format!(
        "=== Harvest {} ===\n\
         Reason: {}\n\
         Pages visited: {}\n\
         Last position: {}\n\
         New links saved: {}\n",
        report.state(),
        report.termination,
        report.pages,
        position,
        report.links_added
    )
}

/// Formats the end-of-job summary
pub fn format_job_report(report: &JobReport) -> String {
    let mut out = format!(
        "=== Capture {} ===\n\
         Processed: {}\n\
         Skipped (already done): {}\n\
         Errored (left pending): {}\n",
        if report.interrupted {
            "interrupted"
        } else {
            "finished"
        },
        report.processed,
        report.skipped,
        report.errored
    );
    if report.errored > 0 {
        out.push_str("Run the capture again to retry pending links.\n");
    }
    out
}

pub fn print_traversal_report(report: &TraversalReport) {
    print!("{}", format_traversal_report(report));
}

pub fn print_job_report(report: &JobReport) {
    print!("{}", format_job_report(report));
}
