//! Scripted `RenderedPage` for unit tests

use crate::browser::{
    BrowserError, BrowserResult, ControlProbe, PageMetrics, RenderedPage, ScrollPosition,
};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;

/// Encodes a solid-color PNG
pub(crate) fn solid_png(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([shade, shade, shade]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[derive(Default)]
struct Inner {
    contents: VecDeque<String>,
    last_content: String,
    probes: VecDeque<ControlProbe>,
    default_probe: Option<ControlProbe>,
    fail_clicks: u32,
    clicks: u32,
    navigations: Vec<String>,
    metrics: Option<PageMetrics>,
    offset: u32,
    scrolls: Vec<u32>,
    fail_scroll: bool,
    fail_screenshots: bool,
    screenshots: u32,
}

/// A page whose responses are queued up front
///
/// Queued contents and probes are served in order; once a queue is drained
/// the last content (or the default probe) repeats. Scrolling clamps to the
/// scrollable range of the configured metrics, and each screenshot is a
/// viewport-sized PNG shaded by its scroll offset.
#[derive(Default)]
pub(crate) struct ScriptedPage {
    inner: Mutex<Inner>,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents<I, S>(self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .lock()
            .unwrap()
            .contents
            .extend(contents.into_iter().map(Into::into));
        self
    }

    pub fn with_probes<I: IntoIterator<Item = ControlProbe>>(self, probes: I) -> Self {
        self.inner.lock().unwrap().probes.extend(probes);
        self
    }

    pub fn with_default_probe(self, probe: ControlProbe) -> Self {
        self.inner.lock().unwrap().default_probe = Some(probe);
        self
    }

    pub fn with_failing_clicks(self, count: u32) -> Self {
        self.inner.lock().unwrap().fail_clicks = count;
        self
    }

    pub fn with_metrics(self, content_height: u32, width: u32, viewport_height: u32) -> Self {
        self.inner.lock().unwrap().metrics = Some(PageMetrics {
            content_height,
            viewport_width: width,
            viewport_height,
        });
        self
    }

    pub fn with_failing_scroll(self) -> Self {
        self.inner.lock().unwrap().fail_scroll = true;
        self
    }

    pub fn with_failing_screenshots(self) -> Self {
        self.inner.lock().unwrap().fail_screenshots = true;
        self
    }

    pub fn clicks(&self) -> u32 {
        self.inner.lock().unwrap().clicks
    }

    pub fn screenshots(&self) -> u32 {
        self.inner.lock().unwrap().screenshots
    }

    pub fn scrolls(&self) -> Vec<u32> {
        self.inner.lock().unwrap().scrolls.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.inner.lock().unwrap().navigations.clone()
    }

    fn max_offset(inner: &Inner) -> u32 {
        inner
            .metrics
            .map_or(0, |m| m.content_height.saturating_sub(m.viewport_height))
    }
}

#[async_trait]
impl RenderedPage for ScriptedPage {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.navigations.push(url.to_string());
        inner.offset = 0;
        Ok(())
    }

    async fn content(&self) -> BrowserResult<String> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(next) = inner.contents.pop_front() {
            inner.last_content = next;
        }
        Ok(inner.last_content.clone())
    }

    async fn probe_control(&self, _selector: &str) -> BrowserResult<ControlProbe> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner
            .probes
            .pop_front()
            .or(inner.default_probe)
            .unwrap_or(ControlProbe::NotFound))
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_clicks > 0 {
            inner.fail_clicks -= 1;
            return Err(BrowserError::Interaction {
                selector: selector.to_string(),
                message: "intercepted".to_string(),
            });
        }
        inner.clicks += 1;
        Ok(())
    }

    async fn metrics(&self) -> BrowserResult<PageMetrics> {
        self.inner
            .lock()
            .unwrap()
            .metrics
            .ok_or_else(|| BrowserError::Script("no metrics scripted".to_string()))
    }

    async fn scroll_to(&self, offset: u32) -> BrowserResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_scroll {
            return Err(BrowserError::Script("scroll failed".to_string()));
        }
        inner.offset = offset.min(Self::max_offset(&inner));
        inner.scrolls.push(offset);
        Ok(())
    }

    async fn scroll_position(&self) -> BrowserResult<ScrollPosition> {
        let inner = self.inner.lock().unwrap();
        let viewport = inner.metrics.map_or(0, |m| m.viewport_height);
        Ok(ScrollPosition {
            offset: inner.offset,
            viewport_bottom: inner.offset + viewport,
        })
    }

    async fn media_ready_ratio(&self) -> BrowserResult<f64> {
        Ok(1.0)
    }

    async fn screenshot(&self) -> BrowserResult<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_screenshots {
            return Err(BrowserError::Screenshot("capture failed".to_string()));
        }
        inner.screenshots += 1;
        let (width, height) = inner
            .metrics
            .map_or((4, 4), |m| (m.viewport_width, m.viewport_height));
        Ok(solid_png(width, height, (inner.offset % 251) as u8))
    }
}
