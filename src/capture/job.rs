//! Resumable capture job
//!
//! Drains the ledger in storage order. Completed records are skipped, each
//! pending record is captured and committed to the ledger on its own, and a
//! failed capture leaves its record pending for the next run.

use crate::browser::wait::pause;
use crate::browser::RenderedPage;
use crate::capture::{artifact_id, CaptureError, CaptureOutcome, CaptureStitcher};
use crate::config::{CaptureConfig, Timing};
use crate::storage::CheckpointLedger;
use crate::FolioError;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Produces the artifact for one link
#[async_trait]
pub trait LinkCapture: Send {
    async fn capture(
        &mut self,
        url: &str,
        artifact: &Path,
    ) -> Result<CaptureOutcome, CaptureError>;
}

/// Captures links by loading each one in the session's page
pub struct BrowserCapture<'a, P> {
    page: &'a P,
    stitcher: CaptureStitcher,
    timing: Timing,
}

impl<'a, P: RenderedPage> BrowserCapture<'a, P> {
    pub fn new(page: &'a P, stitcher: CaptureStitcher, timing: Timing) -> Self {
        Self {
            page,
            stitcher,
            timing,
        }
    }
}

#[async_trait]
impl<'a, P: RenderedPage> LinkCapture for BrowserCapture<'a, P> {
    async fn capture(
        &mut self,
        url: &str,
        artifact: &Path,
    ) -> Result<CaptureOutcome, CaptureError> {
        self.page.navigate(url).await?;
        pause(self.timing.link_load()).await;

        let outcome = self.stitcher.capture(self.page, artifact).await;
        pause(self.timing.between_links()).await;
        outcome
    }
}

/// Counts for one run of the capture job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Captured and committed as done
    pub processed: usize,
    /// Already done when reached
    pub skipped: usize,
    /// Left pending (no identifier, capture failure, or commit not found)
    pub errored: usize,
    /// The run stopped early on an interrupt
    pub interrupted: bool,
}

/// Iterates the ledger and captures every pending link
#[derive(Debug, Clone)]
pub struct CaptureJob {
    artifact_dir: PathBuf,
    extension: String,
}

impl CaptureJob {
    pub fn new(artifact_dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            artifact_dir: artifact_dir.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(&config.artifact_dir, &config.image_extension)
    }

    /// Where the artifact for `id` is written
    pub fn artifact_path(&self, id: &str) -> PathBuf {
        self.artifact_dir.join(format!("{}.{}", id, self.extension))
    }

    /// Runs the job over the whole ledger
    ///
    /// The cancellation token is observed before each record.
    ///
    /// # Returns
    ///
    /// * `Ok(JobReport)` - Counts for this run
    /// * `Err(FolioError)` - The ledger could not be read or rewritten, or
    ///   the artifact directory could not be created
    pub async fn run<C: LinkCapture>(
        &self,
        ledger: &mut CheckpointLedger,
        capture: &mut C,
        cancel: &CancellationToken,
    ) -> Result<JobReport, FolioError> {
        let records = ledger.scan()?;
        std::fs::create_dir_all(&self.artifact_dir)?;

        let mut report = JobReport::default();
        // The scan reads the file as it was when opened
        let mut completed: HashSet<String> = HashSet::new();

        for record in records {
            if cancel.is_cancelled() {
                tracing::warn!("Interrupt received, stopping capture job");
                report.interrupted = true;
                break;
            }

            let record = record?;
            if record.done || completed.contains(&record.url) {
                tracing::debug!("Skipping completed {}", record.url);
                report.skipped += 1;
                continue;
            }

            let Some(id) = artifact_id(&record.url) else {
                tracing::warn!("No artifact name can be derived from {}", record.url);
                report.errored += 1;
                continue;
            };

            let artifact = self.artifact_path(&id);
            tracing::info!("Capturing {} -> {}", record.url, artifact.display());

            match capture.capture(&record.url, &artifact).await {
                Ok(outcome) => {
                    if outcome.truncated {
                        tracing::info!("{} saved with {} frames (truncated)", id, outcome.frames);
                    }
                    if ledger.mark_done(&record.url, true)? {
                        completed.insert(record.url);
                        report.processed += 1;
                    } else {
                        report.errored += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Capture failed for {}: {}", record.url, e);
                    report.errored += 1;
                }
            }
        }

        tracing::info!(
            "Capture job finished: {} processed, {} skipped, {} errored",
            report.processed,
            report.skipped,
            report.errored
        );
        Ok(report)
    }
}
