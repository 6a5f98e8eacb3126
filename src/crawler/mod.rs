//! Crawler module for the listing traversal (pass 1)
//!
//! This module contains the harvesting side of the tool:
//! - Position indicator parsing
//! - Link extraction into the checkpoint ledger
//! - The pagination state machine that ties them together

mod harvester;
mod locator;
mod pagination;

pub use harvester::LinkHarvester;
pub use locator::PageLocator;
pub use pagination::{after_advance, AdvanceOutcome, PaginationController, Step, TraversalReport};

use crate::browser::RenderedPage;
use crate::config::Config;
use crate::storage::CheckpointLedger;
use crate::FolioError;
use tokio_util::sync::CancellationToken;

/// Runs a complete listing traversal on an open page
///
/// This is the main entry point for pass 1. It will:
/// 1. Build the locator, harvester and controller from the configuration
/// 2. Load the listing
/// 3. Harvest every page into the ledger until a terminal state
///
/// # Arguments
///
/// * `config` - The tool configuration
/// * `page` - The session's working page
/// * `cancel` - Observed between pages
///
/// # Returns
///
/// * `Ok(TraversalReport)` - The traversal reached Done, Aborted or Interrupted
/// * `Err(FolioError)` - The listing could not be loaded or the ledger written
pub async fn harvest_listing<P: RenderedPage>(
    config: &Config,
    page: &P,
    cancel: &CancellationToken,
) -> Result<TraversalReport, FolioError> {
    let mut ledger = CheckpointLedger::new(&config.ledger.path);
    let mut controller = PaginationController::new(&config.listing, &config.timing)?;
    controller.run(page, &mut ledger, cancel).await
}
