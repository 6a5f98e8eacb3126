use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Folio
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    pub listing: ListingConfig,
    pub ledger: LedgerConfig,
    pub capture: CaptureConfig,
    #[serde(default)]
    pub timing: Timing,
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,

    /// Seconds to wait for a manual login before the traversal starts
    #[serde(rename = "login-grace-secs", default = "default_login_grace")]
    pub login_grace_secs: u64,

    /// User agent override
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,

    /// Browser window width in pixels
    #[serde(rename = "window-width", default)]
    pub window_width: Option<u32>,

    /// Browser window height in pixels
    #[serde(rename = "window-height", default)]
    pub window_height: Option<u32>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            login_grace_secs: default_login_grace(),
            user_agent: None,
            window_width: None,
            window_height: None,
        }
    }
}

/// Listing surface configuration (pass 1)
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// The first page of the paginated listing
    pub url: String,

    /// Anchors carrying result links, scoped to the results region
    #[serde(rename = "results-selector")]
    pub results_selector: String,

    /// Attribute holding the link identifier on each anchor
    #[serde(rename = "link-attribute")]
    pub link_attribute: String,

    /// Container expected to hold the position indicator
    #[serde(rename = "position-selector")]
    pub position_selector: String,

    /// Broad fallback used when the container yields no indicator
    #[serde(rename = "position-fallback-selector", default = "default_fallback_selector")]
    pub position_fallback_selector: String,

    /// Unit word trailing the "<current> / <total>" indicator
    #[serde(rename = "page-unit-marker", default = "default_unit_marker")]
    pub page_unit_marker: String,

    /// The next-page control
    #[serde(rename = "next-selector")]
    pub next_selector: String,

    /// Safety ceiling on visited pages
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,
}

/// Ledger file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Path to the delimited ledger file
    pub path: String,
}

/// Capture configuration (pass 2)
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Directory receiving one image per completed link
    #[serde(rename = "artifact-dir")]
    pub artifact_dir: String,

    /// Upper bound on frames per composite
    #[serde(rename = "max-frames", default = "default_max_frames")]
    pub max_frames: u32,

    /// Image file extension (png, jpg or jpeg)
    #[serde(rename = "image-extension", default = "default_image_extension")]
    pub image_extension: String,

    /// Poll the lazy-loaded media heuristic after each scroll
    #[serde(rename = "wait-for-media", default = "default_true")]
    pub wait_for_media: bool,
}

/// Delays, retry ceilings and wait bounds (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timing {
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
    #[serde(rename = "page-settle-ms")]
    pub page_settle_ms: u64,
    #[serde(rename = "after-advance-ms")]
    pub after_advance_ms: u64,
    #[serde(rename = "extended-wait-ms")]
    pub extended_wait_ms: u64,
    #[serde(rename = "control-timeout-ms")]
    pub control_timeout_ms: u64,
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,
    #[serde(rename = "scroll-settle-ms")]
    pub scroll_settle_ms: u64,
    #[serde(rename = "media-timeout-ms")]
    pub media_timeout_ms: u64,
    #[serde(rename = "link-load-ms")]
    pub link_load_ms: u64,
    #[serde(rename = "between-links-ms")]
    pub between_links_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            retry_attempts: 5,
            retry_backoff_ms: 1000,
            page_settle_ms: 2000,
            after_advance_ms: 3000,
            extended_wait_ms: 5000,
            control_timeout_ms: 30_000,
            poll_interval_ms: 250,
            scroll_settle_ms: 1000,
            media_timeout_ms: 2000,
            link_load_ms: 5000,
            between_links_ms: 2000,
        }
    }
}

impl Timing {
    /// Zero delays with the production retry ceiling, for tests and fakes
    pub fn instant() -> Self {
        Self {
            retry_attempts: 5,
            retry_backoff_ms: 0,
            page_settle_ms: 0,
            after_advance_ms: 0,
            extended_wait_ms: 0,
            control_timeout_ms: 0,
            poll_interval_ms: 0,
            scroll_settle_ms: 0,
            media_timeout_ms: 0,
            link_load_ms: 0,
            between_links_ms: 0,
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn after_advance(&self) -> Duration {
        Duration::from_millis(self.after_advance_ms)
    }

    pub fn extended_wait(&self) -> Duration {
        Duration::from_millis(self.extended_wait_ms)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.control_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_millis(self.media_timeout_ms)
    }

    pub fn link_load(&self) -> Duration {
        Duration::from_millis(self.link_load_ms)
    }

    pub fn between_links(&self) -> Duration {
        Duration::from_millis(self.between_links_ms)
    }
}

fn default_login_grace() -> u64 {
    90
}

fn default_fallback_selector() -> String {
    "span".to_string()
}

fn default_unit_marker() -> String {
    "頁".to_string()
}

fn default_max_pages() -> u32 {
    1000
}

fn default_max_frames() -> u32 {
    5
}

fn default_image_extension() -> String {
    "png".to_string()
}

fn default_true() -> bool {
    true
}
