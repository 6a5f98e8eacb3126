//! Pagination controller - listing traversal orchestration
//!
//! One traversal loads the listing once, then repeats:
//! 1. Read the position indicator (may be unknown)
//! 2. Harvest links from the current page into the ledger
//! 3. Stop on the last page or at the page ceiling
//! 4. Trigger the next-page control, recovering once from a failed advance
//!
//! The ledger is written as each page is harvested, so nothing collected is
//! lost when the traversal ends early.

use crate::browser::wait::{self, pause};
use crate::browser::{ControlProbe, RenderedPage, RetryPolicy};
use crate::config::{ListingConfig, Timing};
use crate::crawler::{LinkHarvester, PageLocator};
use crate::state::{PagePosition, Termination, TraversalState};
use crate::storage::CheckpointLedger;
use crate::{ConfigError, FolioError};
use tokio_util::sync::CancellationToken;

/// Result of one attempt to reach the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The control was clicked
    Advanced,
    /// The control is disabled; there is no next page
    Disabled,
    /// The control never appeared or never became clickable
    Failed,
}

/// What the controller does after an advance attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Harvest the newly loaded page
    Harvest,
    /// Wait the extended delay and attempt the advance once more
    ExtendedRetry,
    /// Stop the traversal
    Stop(Termination),
}

/// Transition table for the `Advancing` state
///
/// `position` is the indicator re-read after a failed advance. A disabled
/// control is authoritative. A failure while pages remain earns exactly one
/// extended retry; a second failure, or a failure with no readable position,
/// aborts.
pub fn after_advance(
    outcome: AdvanceOutcome,
    position: Option<PagePosition>,
    extended_retry_used: bool,
) -> Step {
    match (outcome, extended_retry_used) {
        (AdvanceOutcome::Advanced, _) => Step::Harvest,
        (AdvanceOutcome::Disabled, _) => Step::Stop(Termination::ControlDisabled),
        (AdvanceOutcome::Failed, true) => Step::Stop(Termination::NavigationExhausted),
        (AdvanceOutcome::Failed, false) => match position {
            Some(p) if p.is_last() => Step::Stop(Termination::LastPage),
            Some(_) => Step::ExtendedRetry,
            None => Step::Stop(Termination::PositionUnknown),
        },
    }
}

/// Summary of a finished traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalReport {
    /// Listing pages harvested
    pub pages: u32,
    /// New ledger records created
    pub links_added: usize,
    /// Last position read from the indicator
    pub last_position: Option<PagePosition>,
    /// Why the traversal stopped
    pub termination: Termination,
}

impl TraversalReport {
    pub fn state(&self) -> TraversalState {
        self.termination.state()
    }
}

/// Drives one full listing traversal
pub struct PaginationController {
    listing_url: String,
    next_selector: String,
    max_pages: u32,
    locator: PageLocator,
    harvester: LinkHarvester,
    retry: RetryPolicy,
    timing: Timing,
    state: TraversalState,
}

impl PaginationController {
    /// Creates a controller from the listing configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PaginationController)` - Ready to run
    /// * `Err(ConfigError)` - A configured selector does not parse
    pub fn new(listing: &ListingConfig, timing: &Timing) -> Result<Self, ConfigError> {
        let retry = RetryPolicy::from_timing(timing);
        let locator = PageLocator::from_config(listing).map_err(ConfigError::InvalidSelector)?;
        let harvester =
            LinkHarvester::from_config(listing, retry).map_err(ConfigError::InvalidSelector)?;

        Ok(Self {
            listing_url: listing.url.clone(),
            next_selector: listing.next_selector.clone(),
            max_pages: listing.max_pages.max(1),
            locator,
            harvester,
            retry,
            timing: timing.clone(),
            state: TraversalState::Start,
        })
    }

    /// The state the controller is in (terminal after `run` returns)
    pub fn state(&self) -> TraversalState {
        self.state
    }

    /// Runs the traversal to a terminal state
    ///
    /// The cancellation token is observed between pages.
    ///
    /// # Returns
    ///
    /// * `Ok(TraversalReport)` - Done, Aborted or Interrupted, with progress kept
    /// * `Err(FolioError)` - The listing could not be loaded or the ledger
    ///   could not be written
    pub async fn run<P: RenderedPage>(
        &mut self,
        page: &P,
        ledger: &mut CheckpointLedger,
        cancel: &CancellationToken,
    ) -> Result<TraversalReport, FolioError> {
        self.state = TraversalState::Start;
        tracing::info!("Loading listing {}", self.listing_url);
        page.navigate(&self.listing_url).await?;

        let mut pages = 0;
        let mut links_added = 0;
        let mut last_position = None;

        let termination = loop {
            if cancel.is_cancelled() {
                tracing::warn!("Interrupt received, stopping traversal");
                break Termination::Interrupted;
            }

            self.state = TraversalState::Harvesting;
            pages += 1;
            pause(self.timing.page_settle()).await;

            let position = self.locator.locate_on(page).await;
            match position {
                Some(p) => {
                    tracing::info!("Harvesting page {} (position {})", pages, p);
                    last_position = Some(p);
                }
                None => tracing::info!("Harvesting page {} (position unknown)", pages),
            }

            links_added += self.harvester.harvest(page, ledger).await?;
            tracing::info!("{} new links saved so far", links_added);

            if position.map_or(false, |p| p.is_last()) {
                break Termination::LastPage;
            }

            if pages >= self.max_pages {
                tracing::warn!("Reached the page ceiling of {}", self.max_pages);
                break Termination::SafetyCeiling;
            }

            self.state = TraversalState::Advancing;
            if let Some(termination) = self.advance_with_recovery(page).await {
                break termination;
            }

            pause(self.timing.after_advance()).await;
        };

        self.state = termination.state();
        match self.state {
            TraversalState::Done => {
                tracing::info!("Traversal done after {} pages: {}", pages, termination)
            }
            _ => tracing::warn!(
                "Traversal {} after {} pages: {}",
                self.state,
                pages,
                termination
            ),
        }

        Ok(TraversalReport {
            pages,
            links_added,
            last_position,
            termination,
        })
    }

    /// Advances, applying the transition table until it settles
    ///
    /// Returns `None` when the next page is loaded.
    async fn advance_with_recovery<P: RenderedPage>(&self, page: &P) -> Option<Termination> {
        let mut extended_retry_used = false;
        loop {
            let outcome = self.advance(page).await;
            let position = if outcome == AdvanceOutcome::Failed {
                self.locator.locate_on(page).await
            } else {
                None
            };

            match after_advance(outcome, position, extended_retry_used) {
                Step::Harvest => return None,
                Step::ExtendedRetry => {
                    if let Some(p) = position {
                        tracing::warn!(
                            "Could not advance although {} pages remain ({}), retrying once after {:?}",
                            p.remaining(),
                            p,
                            self.timing.extended_wait()
                        );
                    }
                    pause(self.timing.extended_wait()).await;
                    extended_retry_used = true;
                }
                Step::Stop(termination) => return Some(termination),
            }
        }
    }

    /// Makes one attempt to trigger the next-page control
    ///
    /// Waits for the control to appear, then probes and clicks with bounded
    /// retries, re-reading the control on each attempt since the render may
    /// replace it.
    async fn advance<P: RenderedPage>(&self, page: &P) -> AdvanceOutcome {
        let selector = self.next_selector.as_str();

        let appeared = wait::until(
            self.timing.control_timeout(),
            self.timing.poll_interval(),
            || async move {
                matches!(page.probe_control(selector).await, Ok(probe) if probe != ControlProbe::NotFound)
            },
        )
        .await;

        if !appeared {
            tracing::warn!("Next-page control '{}' did not appear", selector);
            return AdvanceOutcome::Failed;
        }

        for attempt in 1..=self.retry.attempts {
            match page.probe_control(selector).await {
                Ok(ControlProbe::Disabled) => {
                    tracing::info!("Next-page control is disabled, last page reached");
                    return AdvanceOutcome::Disabled;
                }
                Ok(ControlProbe::Ready) => match page.click(selector).await {
                    Ok(()) => {
                        tracing::debug!("Clicked next-page control");
                        return AdvanceOutcome::Advanced;
                    }
                    Err(e) => tracing::debug!(
                        "Click failed, attempt {}/{}: {}",
                        attempt,
                        self.retry.attempts,
                        e
                    ),
                },
                Ok(probe) => tracing::debug!(
                    "Next-page control not clickable ({:?}), attempt {}/{}",
                    probe,
                    attempt,
                    self.retry.attempts
                ),
                Err(e) => tracing::debug!(
                    "Probing next-page control failed, attempt {}/{}: {}",
                    attempt,
                    self.retry.attempts,
                    e
                ),
            }

            self.retry.backoff_after(attempt).await;
        }

        tracing::warn!(
            "Next-page control still not clickable after {} attempts",
            self.retry.attempts
        );
        AdvanceOutcome::Failed
    }
}
