//! Link harvesting from the current listing page
//!
//! Link identifiers are read from a page-defined attribute on anchors inside
//! the results region. An empty read is treated as "not rendered yet" and
//! retried with a fixed backoff; exhausting the retries yields zero new links
//! rather than an error, so the traversal moves on.

use crate::browser::{RenderedPage, RetryPolicy};
use crate::config::ListingConfig;
use crate::storage::{CheckpointLedger, LedgerResult};
use scraper::{Html, Selector};

/// Extracts result links and records them in the ledger
#[derive(Debug, Clone)]
pub struct LinkHarvester {
    results: Selector,
    attribute: String,
    retry: RetryPolicy,
}

impl LinkHarvester {
    pub fn new(results_selector: &str, attribute: &str, retry: RetryPolicy) -> Result<Self, String> {
        let results = Selector::parse(results_selector)
            .map_err(|e| format!("invalid selector '{}': {:?}", results_selector, e))?;

        Ok(Self {
            results,
            attribute: attribute.to_string(),
            retry,
        })
    }

    pub fn from_config(config: &ListingConfig, retry: RetryPolicy) -> Result<Self, String> {
        Self::new(&config.results_selector, &config.link_attribute, retry)
    }

    /// Extracts non-empty link identifiers from page markup, in document order
    pub fn extract_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.results)
            .filter_map(|element| element.value().attr(&self.attribute))
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty())
            .collect()
    }

    /// Harvests the current page into the ledger
    ///
    /// Duplicates are resolved by the ledger: only links not already recorded
    /// are appended, and only those are counted.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` - `n` new records were appended (0 after exhausted retries)
    /// * `Err(LedgerError)` - The ledger could not be written; fatal to the pass
    pub async fn harvest<P: RenderedPage>(
        &self,
        page: &P,
        ledger: &mut CheckpointLedger,
    ) -> LedgerResult<usize> {
        for attempt in 1..=self.retry.attempts {
            match page.content().await {
                Ok(html) => {
                    let links = self.extract_links(&html);
                    if !links.is_empty() {
                        let found = links.len();
                        let added = ledger.append_all(&links)?;
                        tracing::info!(
                            "Found {} links on page, {} new (ledger: {})",
                            found,
                            added,
                            ledger.path().display()
                        );
                        return Ok(added);
                    }
                    tracing::debug!(
                        "No links yet, attempt {}/{}",
                        attempt,
                        self.retry.attempts
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        "Reading page failed on attempt {}/{}: {}",
                        attempt,
                        self.retry.attempts,
                        e
                    );
                }
            }

            self.retry.backoff_after(attempt).await;
        }

        tracing::warn!(
            "No links extracted after {} attempts, continuing",
            self.retry.attempts
        );
        Ok(0)
    }
}
