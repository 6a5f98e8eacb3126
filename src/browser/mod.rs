//! Browser module: the live rendering session and its seam
//!
//! Every component that touches the page receives a `&P where P: RenderedPage`
//! from one owning scope. The production implementation drives Chromium over
//! CDP (`chrome`); tests substitute scripted pages.

mod chrome;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::{ChromePage, ChromeSession};
pub use wait::RetryPolicy;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised by browser automation calls
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Interaction with '{selector}' failed: {message}")]
    Interaction { selector: String, message: String },

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// Outcome of probing an interactive control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlProbe {
    /// Present, enabled and clickable
    Ready,
    /// Present but disabled; authoritative for "no further page"
    Disabled,
    /// Not in the document
    NotFound,
    /// Present but not yet clickable (hidden, zero-sized, pointer events off)
    NotYetInteractive,
}

/// Dimensions measured from the live render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    pub content_height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// Where the viewport currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPosition {
    pub offset: u32,
    pub viewport_bottom: u32,
}

/// A page rendered by a live browser session
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// Loads `url` in this page
    async fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// Serializes the current DOM
    async fn content(&self) -> BrowserResult<String>;

    /// Reports whether the control matched by `selector` can be triggered
    async fn probe_control(&self, selector: &str) -> BrowserResult<ControlProbe>;

    /// Scrolls the control into view and clicks it
    async fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Measures content height and viewport size
    async fn metrics(&self) -> BrowserResult<PageMetrics>;

    /// Scrolls the document to a vertical offset
    async fn scroll_to(&self, offset: u32) -> BrowserResult<()>;

    /// Reads the current scroll offset and viewport bottom
    async fn scroll_position(&self) -> BrowserResult<ScrollPosition>;

    /// Fraction of images in or near the viewport that finished loading
    async fn media_ready_ratio(&self) -> BrowserResult<f64>;

    /// Captures the visible viewport as PNG bytes
    async fn screenshot(&self) -> BrowserResult<Vec<u8>>;
}
