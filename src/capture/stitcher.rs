//! Scroll-and-composite page capture
//!
//! Pages no taller than the viewport are captured in one frame. Taller pages
//! are walked top to bottom in steps of 90% of the viewport height, one
//! screenshot per step, until the viewport reaches the bottom or the frame
//! ceiling is hit. Frames are stacked in capture order without removing the
//! overlap band.

use crate::browser::wait::{self, pause};
use crate::browser::{PageMetrics, RenderedPage};
use crate::capture::{CaptureError, CaptureFrame, CaptureOutcome};
use crate::config::{CaptureConfig, Timing};
use image::{imageops, ImageFormat, RgbImage};
use std::path::Path;

/// Viewport bottom within this many pixels of the content height counts as the end
const BOTTOM_TOLERANCE: u32 = 20;

/// Scroll offsets further than this from the requested one are retried once
const DRIFT_TOLERANCE: u32 = 50;

/// Fraction of nearby images that must be loaded before a frame is taken
const MEDIA_READY_RATIO: f64 = 0.8;

/// Produces one image per page, compositing when the page scrolls
#[derive(Debug, Clone)]
pub struct CaptureStitcher {
    max_frames: u32,
    wait_for_media: bool,
    timing: Timing,
}

impl CaptureStitcher {
    pub fn new(max_frames: u32, wait_for_media: bool, timing: Timing) -> Self {
        Self {
            max_frames: max_frames.max(1),
            wait_for_media,
            timing,
        }
    }

    pub fn from_config(config: &CaptureConfig, timing: &Timing) -> Self {
        Self::new(config.max_frames, config.wait_for_media, timing.clone())
    }

    /// Captures the current page into `output`
    ///
    /// The image format follows the extension of `output`. Any failure of the
    /// scrolling capture falls back to a single screenshot of the current
    /// view, so a partial result is written whenever one is possible.
    ///
    /// # Returns
    ///
    /// * `Ok(CaptureOutcome)` - An artifact was written
    /// * `Err(CaptureError::Exhausted)` - Both the scrolling and the single
    ///   frame capture failed
    pub async fn capture<P: RenderedPage>(
        &self,
        page: &P,
        output: &Path,
    ) -> Result<CaptureOutcome, CaptureError> {
        let primary = match self.capture_scrolling(page, output).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) => e,
        };

        tracing::warn!(
            "Scrolling capture failed ({}), falling back to the current view",
            primary
        );

        match self.capture_view(page, output).await {
            Ok(()) => Ok(CaptureOutcome {
                fallback: true,
                ..CaptureOutcome::single()
            }),
            Err(fallback) => Err(CaptureError::Exhausted {
                primary: primary.to_string(),
                fallback: fallback.to_string(),
            }),
        }
    }

    async fn capture_scrolling<P: RenderedPage>(
        &self,
        page: &P,
        output: &Path,
    ) -> Result<CaptureOutcome, CaptureError> {
        let metrics = page.metrics().await?;
        tracing::debug!(
            "Page height {}px, viewport {}x{}px",
            metrics.content_height,
            metrics.viewport_width,
            metrics.viewport_height
        );

        if metrics.content_height <= metrics.viewport_height {
            self.capture_view(page, output).await?;
            return Ok(CaptureOutcome::single());
        }

        let (frames, truncated) = self.collect_frames(page, metrics).await?;
        if truncated {
            tracing::warn!(
                "Capture truncated at {} frames before reaching the bottom",
                frames.len()
            );
        }

        let written = match frames.as_slice() {
            [only] => write_frame(&only.image, output),
            _ => stitch(&frames)
                .map_err(CaptureError::from)
                .and_then(|composite| Ok(composite.save(output)?)),
        };

        if let Err(e) = page.scroll_to(0).await {
            tracing::debug!("Could not scroll back to top: {}", e);
        }
        written?;

        tracing::debug!("Wrote {} frames to {}", frames.len(), output.display());
        Ok(CaptureOutcome {
            frames: frames.len() as u32,
            truncated,
            fallback: false,
        })
    }

    async fn capture_view<P: RenderedPage>(
        &self,
        page: &P,
        output: &Path,
    ) -> Result<(), CaptureError> {
        let bytes = page.screenshot().await?;
        write_frame(&bytes, output)
    }

    /// Walks the page top to bottom, returning frames and whether the frame
    /// ceiling cut the walk short
    async fn collect_frames<P: RenderedPage>(
        &self,
        page: &P,
        metrics: PageMetrics,
    ) -> Result<(Vec<CaptureFrame>, bool), CaptureError> {
        let height = metrics.content_height;
        let step = (metrics.viewport_height.saturating_mul(9) / 10).max(1);
        let max_reachable = height.saturating_sub(metrics.viewport_height);

        page.scroll_to(0).await?;

        let mut frames = Vec::new();
        let mut offset = 0u32;
        let mut reached_bottom = false;

        while offset < height && frames.len() < self.max_frames as usize {
            page.scroll_to(offset).await?;
            pause(self.timing.scroll_settle()).await;

            if self.wait_for_media {
                self.await_media(page, offset).await;
            }

            let mut position = page.scroll_position().await?;
            if offset <= max_reachable && position.offset.abs_diff(offset) > DRIFT_TOLERANCE {
                tracing::debug!(
                    "Scroll drifted to {} instead of {}, retrying",
                    position.offset,
                    offset
                );
                page.scroll_to(offset).await?;
                pause(self.timing.scroll_settle()).await;
                position = page.scroll_position().await?;
            }

            frames.push(CaptureFrame {
                vertical_offset: offset,
                image: page.screenshot().await?,
            });
            tracing::debug!("Captured frame {} at offset {}", frames.len(), offset);

            if position.viewport_bottom >= height.saturating_sub(BOTTOM_TOLERANCE) {
                reached_bottom = true;
                break;
            }

            offset = offset.saturating_add(step);
        }

        let truncated = !reached_bottom && offset < height;
        Ok((frames, truncated))
    }

    async fn await_media<P: RenderedPage>(&self, page: &P, offset: u32) {
        let ready = wait::until(
            self.timing.media_timeout(),
            self.timing.poll_interval(),
            || async move {
                page.media_ready_ratio()
                    .await
                    .map_or(true, |ratio| ratio >= MEDIA_READY_RATIO)
            },
        )
        .await;

        if !ready {
            tracing::debug!("Media still loading at offset {}, capturing anyway", offset);
        }
    }
}

/// Stacks frames top to bottom in capture order
///
/// The composite is as wide as the widest frame (narrower frames are padded
/// with black) and as tall as all frames together.
pub fn stitch(frames: &[CaptureFrame]) -> Result<RgbImage, image::ImageError> {
    let decoded = frames
        .iter()
        .map(|frame| image::load_from_memory(&frame.image).map(|img| img.to_rgb8()))
        .collect::<Result<Vec<_>, _>>()?;

    let width = decoded.iter().map(|img| img.width()).max().unwrap_or(0);
    let height = decoded.iter().map(|img| img.height()).sum();

    let mut canvas = RgbImage::new(width, height);
    let mut y = 0i64;
    for img in &decoded {
        imageops::replace(&mut canvas, img, 0, y);
        y += i64::from(img.height());
    }

    Ok(canvas)
}

/// Writes one screenshot; PNG targets get the bytes verbatim
fn write_frame(bytes: &[u8], output: &Path) -> Result<(), CaptureError> {
    match ImageFormat::from_path(output) {
        Ok(ImageFormat::Png) => std::fs::write(output, bytes)?,
        _ => image::load_from_memory(bytes)?.to_rgb8().save(output)?,
    }
    Ok(())
}
