//! Position indicator parsing
//!
//! The listing renders its position as text such as `2 / 796 頁`. The
//! locator searches a narrowly-scoped container first and, only when that
//! yields nothing, every element matched by a broad fallback selector.

use crate::browser::RenderedPage;
use crate::config::ListingConfig;
use crate::state::PagePosition;
use regex::Regex;
use scraper::{Html, Selector};

/// Reads `(current, total)` from the rendered position indicator
#[derive(Debug, Clone)]
pub struct PageLocator {
    pattern: Regex,
    narrow: Selector,
    broad: Selector,
}

impl PageLocator {
    /// Builds a locator for `<int> / <int> <unit_marker>` indicators
    ///
    /// # Returns
    ///
    /// * `Ok(PageLocator)` - Both selectors parsed
    /// * `Err(String)` - A selector is not valid CSS
    pub fn new(narrow: &str, broad: &str, unit_marker: &str) -> Result<Self, String> {
        let pattern = Regex::new(&format!(
            r"(\d+)\s*/\s*(\d+)\s*{}",
            regex::escape(unit_marker.trim())
        ))
        .map_err(|e| e.to_string())?;

        Ok(Self {
            pattern,
            narrow: parse_selector(narrow)?,
            broad: parse_selector(broad)?,
        })
    }

    pub fn from_config(config: &ListingConfig) -> Result<Self, String> {
        Self::new(
            &config.position_selector,
            &config.position_fallback_selector,
            &config.page_unit_marker,
        )
    }

    /// Returns the first fragment that carries a valid indicator
    ///
    /// Fragments with zero page numbers or numbers too large for `u32` are
    /// skipped. `None` means the position is unknown, which is not an error.
    pub fn locate<I, S>(&self, fragments: I) -> Option<PagePosition>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fragments.into_iter().find_map(|fragment| {
            let captures = self.pattern.captures(fragment.as_ref().trim())?;
            let current = captures[1].parse().ok()?;
            let total = captures[2].parse().ok()?;
            PagePosition::new(current, total)
        })
    }

    /// Locates the position in serialized page markup, narrow tier first
    pub fn locate_in_html(&self, html: &str) -> Option<PagePosition> {
        let document = Html::parse_document(html);
        self.locate(element_texts(&document, &self.narrow))
            .or_else(|| self.locate(element_texts(&document, &self.broad)))
    }

    /// Locates the position on a live page
    ///
    /// A failure to read the page is logged and reported as unknown.
    pub async fn locate_on<P: RenderedPage>(&self, page: &P) -> Option<PagePosition> {
        match page.content().await {
            Ok(html) => {
                let position = self.locate_in_html(&html);
                if position.is_none() {
                    tracing::warn!("Position indicator not found on page");
                }
                position
            }
            Err(e) => {
                tracing::warn!("Could not read page for position indicator: {}", e);
                None
            }
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector '{}': {:?}", selector, e))
}

fn element_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
