//! Capture module for the second pass
//!
//! This module turns pending ledger records into image artifacts:
//! - Scroll-and-composite capture of pages taller than one viewport
//! - The resumable job that drains the ledger link by link
//! - Artifact naming derived from each link

mod job;
mod stitcher;

pub use job::{BrowserCapture, CaptureJob, JobReport, LinkCapture};
pub use stitcher::{stitch, CaptureStitcher};

use crate::browser::{BrowserError, RenderedPage};
use crate::config::Config;
use crate::storage::CheckpointLedger;
use crate::FolioError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Errors raised while producing one artifact
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Browser error during capture: {0}")]
    Browser(#[from] BrowserError),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("All capture strategies failed (scrolling: {primary}; single frame: {fallback})")]
    Exhausted { primary: String, fallback: String },
}

/// One viewport screenshot taken during a capture session
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    /// Requested scroll offset when the frame was taken
    pub vertical_offset: u32,
    /// Encoded screenshot (PNG)
    pub image: Vec<u8>,
}

/// What a successful capture produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// Frames in the written artifact
    pub frames: u32,
    /// The frame ceiling was hit before the bottom of the page
    pub truncated: bool,
    /// The scrolling capture failed and a single view was written instead
    pub fallback: bool,
}

impl CaptureOutcome {
    pub fn single() -> Self {
        Self {
            frames: 1,
            truncated: false,
            fallback: false,
        }
    }
}

/// Derives a stable artifact identifier from a link
///
/// The identifier is the last non-empty path segment, with characters outside
/// `[A-Za-z0-9._-]` replaced by `_`.
///
/// # Returns
///
/// * `Some(id)` - A usable file stem
/// * `None` - The link has no usable path segment
///
/// # Examples
///
/// ```
/// use folio::capture::artifact_id;
///
/// assert_eq!(artifact_id("https://www.instagram.com/some.user/"), Some("some.user".to_string()));
/// assert_eq!(artifact_id("https://www.instagram.com/"), None);
/// ```
pub fn artifact_id(link: &str) -> Option<String> {
    let segment = match Url::parse(link.trim()) {
        Ok(url) => url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
        Err(_) => link
            .split(&['?', '#'][..])
            .next()?
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .last()?
            .to_string(),
    };

    let id: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if id.trim_matches('.').is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Runs a complete capture pass on an open page
///
/// The ledger must already exist; a missing or malformed ledger is reported
/// before any link is touched.
///
/// # Arguments
///
/// * `config` - The tool configuration
/// * `page` - The session's working page
/// * `cancel` - Observed between links
///
/// # Returns
///
/// * `Ok(JobReport)` - Counts for this run
/// * `Err(FolioError)` - The ledger or artifact directory is unusable
pub async fn capture_ledger<P: RenderedPage>(
    config: &Config,
    page: &P,
    cancel: &CancellationToken,
) -> Result<JobReport, FolioError> {
    let mut ledger = CheckpointLedger::open_existing(&config.ledger.path)?;
    let stitcher = CaptureStitcher::from_config(&config.capture, &config.timing);
    let mut capture = BrowserCapture::new(page, stitcher, config.timing.clone());
    let job = CaptureJob::from_config(&config.capture);

    job.run(&mut ledger, &mut capture, cancel).await
}
