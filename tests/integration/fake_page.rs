//! An in-memory listing served through the `RenderedPage` seam

use async_trait::async_trait;
use folio::browser::{
    BrowserError, BrowserResult, ControlProbe, PageMetrics, RenderedPage, ScrollPosition,
};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Mutex;

pub const LISTING_URL: &str = "https://listing.test/search";

/// Builds one listing page with the given result links and indicator
pub fn listing_page(links: &[&str], current: u32, total: u32) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a class="card" data-sns-link="{}">profile</a>"#, link))
        .collect();
    format!(
        r#"<html><body>
        <div class="results">{}</div>
        <div class="pagination"><span>{} / {} 頁</span><button class="next">next</button></div>
        </body></html>"#,
        anchors, current, total
    )
}

struct State {
    index: usize,
    clicks: u32,
    navigations: Vec<String>,
    offset: u32,
    disabled_from: Option<usize>,
}

/// A paginated listing plus uniformly sized detail pages
///
/// The next control is ready on every page but the last, where it is
/// disabled. Any url other than the listing loads a detail page of the
/// configured height.
pub struct FakeSite {
    pages: Vec<String>,
    detail_height: u32,
    viewport: (u32, u32),
    state: Mutex<State>,
}

impl FakeSite {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            detail_height: 900,
            viewport: (16, 400),
            state: Mutex::new(State {
                index: 0,
                clicks: 0,
                navigations: Vec::new(),
                offset: 0,
                disabled_from: None,
            }),
        }
    }

    /// Disables the next control from page `index` (zero based) onwards
    pub fn disabled_from(self, index: usize) -> Self {
        self.state.lock().unwrap().disabled_from = Some(index);
        self
    }

    pub fn clicks(&self) -> u32 {
        self.state.lock().unwrap().clicks
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }
}

#[async_trait]
impl RenderedPage for FakeSite {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.offset = 0;
        if url == LISTING_URL {
            state.index = 0;
        }
        Ok(())
    }

    async fn content(&self) -> BrowserResult<String> {
        let state = self.state.lock().unwrap();
        Ok(self.pages.get(state.index).cloned().unwrap_or_default())
    }

    async fn probe_control(&self, _selector: &str) -> BrowserResult<ControlProbe> {
        let state = self.state.lock().unwrap();
        let last = state.index + 1 >= self.pages.len();
        let disabled = state.disabled_from.map_or(false, |from| state.index >= from);
        Ok(if last || disabled {
            ControlProbe::Disabled
        } else {
            ControlProbe::Ready
        })
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.index + 1 >= self.pages.len() {
            return Err(BrowserError::Interaction {
                selector: selector.to_string(),
                message: "no next page".to_string(),
            });
        }
        state.index += 1;
        state.clicks += 1;
        Ok(())
    }

    async fn metrics(&self) -> BrowserResult<PageMetrics> {
        Ok(PageMetrics {
            content_height: self.detail_height,
            viewport_width: self.viewport.0,
            viewport_height: self.viewport.1,
        })
    }

    async fn scroll_to(&self, offset: u32) -> BrowserResult<()> {
        let max = self.detail_height.saturating_sub(self.viewport.1);
        self.state.lock().unwrap().offset = offset.min(max);
        Ok(())
    }

    async fn scroll_position(&self) -> BrowserResult<ScrollPosition> {
        let offset = self.state.lock().unwrap().offset;
        Ok(ScrollPosition {
            offset,
            viewport_bottom: offset + self.viewport.1,
        })
    }

    async fn media_ready_ratio(&self) -> BrowserResult<f64> {
        Ok(1.0)
    }

    async fn screenshot(&self) -> BrowserResult<Vec<u8>> {
        let (width, height) = self.viewport;
        let image = RgbImage::from_pixel(width, height, Rgb([30, 60, 90]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| BrowserError::Screenshot(e.to_string()))?;
        Ok(bytes)
    }
}
