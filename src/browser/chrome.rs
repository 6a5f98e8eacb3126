//! Chromium session over the DevTools protocol
//!
//! One `ChromeSession` owns the browser process, its event handler task and
//! the single page every component drives. It is acquired once per run and
//! released with `close`; dropping it without closing still kills the child
//! process.

use crate::browser::{
    BrowserError, BrowserResult, ControlProbe, PageMetrics, RenderedPage, ScrollPosition,
};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

const MEASURE_SCRIPT: &str = r#"(() => ({
    contentHeight: Math.ceil(Math.max(
        document.body ? document.body.scrollHeight : 0,
        document.body ? document.body.offsetHeight : 0,
        document.documentElement.clientHeight,
        document.documentElement.scrollHeight,
        document.documentElement.offsetHeight)),
    viewportWidth: Math.round(window.innerWidth),
    viewportHeight: Math.round(window.innerHeight)
}))()"#;

const SCROLL_POSITION_SCRIPT: &str = r#"(() => ({
    offset: Math.max(0, Math.round(window.pageYOffset)),
    viewportBottom: Math.max(0, Math.round(window.pageYOffset + window.innerHeight))
}))()"#;

// Images overlapping the viewport (with a 200px margin) that have decoded
const MEDIA_READY_SCRIPT: &str = r#"(() => {
    const top = window.pageYOffset;
    const height = window.innerHeight;
    let visible = 0;
    let loaded = 0;
    for (const img of document.querySelectorAll('img')) {
        const rect = img.getBoundingClientRect();
        const imgTop = rect.top + top;
        const imgBottom = rect.bottom + top;
        if (imgBottom >= top - 200 && imgTop <= top + height + 200) {
            visible++;
            if (img.complete && img.naturalWidth > 0) {
                loaded++;
            }
        }
    }
    return visible > 0 ? loaded / visible : 1;
})()"#;

/// An open browser with its single working page
pub struct ChromeSession {
    browser: Browser,
    page: ChromePage,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launches Chromium and opens a blank working page
    pub async fn launch(config: &BrowserConfig) -> BrowserResult<Self> {
        let mut builder = CdpBrowserConfig::builder()
            .viewport(None)
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled");

        if !config.headless {
            builder = builder.with_head();
        }
        if let (Some(width), Some(height)) = (config.window_width, config.window_height) {
            builder = builder.window_size(width, height);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.arg(format!("--user-agent={}", user_agent));
        }

        let cdp_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;

        tracing::info!(
            "Browser session started ({})",
            if config.headless { "headless" } else { "visible" }
        );

        Ok(Self {
            browser,
            page: ChromePage { page },
            handler,
        })
    }

    /// The page all components drive
    pub fn page(&self) -> &ChromePage {
        &self.page
    }

    /// Closes the browser and stops the event handler
    pub async fn close(mut self) -> BrowserResult<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();

        match closed {
            Ok(_) => {
                tracing::info!("Browser session closed");
                Ok(())
            }
            Err(e) => Err(BrowserError::Protocol(e.to_string())),
        }
    }
}

/// Chromium-backed `RenderedPage`
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    async fn eval<T: DeserializeOwned>(&self, script: &str) -> BrowserResult<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }
}

fn interaction(selector: &str, message: impl ToString) -> BrowserError {
    BrowserError::Interaction {
        selector: selector.to_string(),
        message: message.to_string(),
    }
}

/// Embeds a selector in a script as a string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait]
impl RenderedPage for ChromePage {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn content(&self) -> BrowserResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn probe_control(&self, selector: &str) -> BrowserResult<ControlProbe> {
        let script = format!(
            r#"(() => {{
    const el = document.querySelector({});
    if (!el) return "missing";
    if (el.disabled || el.hasAttribute("disabled") || el.getAttribute("aria-disabled") === "true") return "disabled";
    const rect = el.getBoundingClientRect();
    const style = window.getComputedStyle(el);
    if (rect.width === 0 || rect.height === 0 || style.visibility === "hidden" || style.pointerEvents === "none") return "pending";
    return "ready";
}})()"#,
            js_string(selector)
        );

        let status: String = self.eval(&script).await?;
        Ok(match status.as_str() {
            "ready" => ControlProbe::Ready,
            "disabled" => ControlProbe::Disabled,
            "pending" => ControlProbe::NotYetInteractive,
            _ => ControlProbe::NotFound,
        })
    }

    async fn click(&self, selector: &str) -> BrowserResult<()> {
        let script = format!(
            r#"(() => {{
    const el = document.querySelector({});
    if (el) el.scrollIntoView({{block: "center"}});
    return el !== null;
}})()"#,
            js_string(selector)
        );
        let present: bool = self.eval(&script).await?;
        if !present {
            return Err(interaction(selector, "element disappeared"));
        }

        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| interaction(selector, e))?;
        element.click().await.map_err(|e| interaction(selector, e))?;
        Ok(())
    }

    async fn metrics(&self) -> BrowserResult<PageMetrics> {
        self.eval(MEASURE_SCRIPT).await
    }

    async fn scroll_to(&self, offset: u32) -> BrowserResult<()> {
        let script = format!("(() => {{ window.scrollTo(0, {}); return true; }})()", offset);
        let _: bool = self.eval(&script).await?;
        Ok(())
    }

    async fn scroll_position(&self) -> BrowserResult<ScrollPosition> {
        self.eval(SCROLL_POSITION_SCRIPT).await
    }

    async fn media_ready_ratio(&self) -> BrowserResult<f64> {
        self.eval(MEDIA_READY_SCRIPT).await
    }

    async fn screenshot(&self) -> BrowserResult<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build(),
            )
            .await
            .map_err(|e| BrowserError::Screenshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_selector() {
        assert_eq!(js_string("button.next"), "\"button.next\"");
        assert_eq!(js_string("a[data-x=\"1\"]"), "\"a[data-x=\\\"1\\\"]\"");
    }
}
