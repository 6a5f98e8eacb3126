use crate::config::types::{CaptureConfig, Config, LedgerConfig, ListingConfig, Timing};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Image extensions the compositor can encode
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_listing_config(&config.listing)?;
    validate_ledger_config(&config.ledger)?;
    validate_capture_config(&config.capture)?;
    validate_timing(&config.timing)?;
    Ok(())
}

/// Validates the listing configuration
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid listing url '{}': {}", config.url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "Listing url '{}' must use http or https",
            config.url
        )));
    }

    validate_selector("results-selector", &config.results_selector)?;
    validate_selector("position-selector", &config.position_selector)?;
    validate_selector(
        "position-fallback-selector",
        &config.position_fallback_selector,
    )?;

    // Consumed by document.querySelector in the browser, so only non-emptiness is checked here
    if config.next_selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "next-selector cannot be empty".to_string(),
        ));
    }

    if config.link_attribute.trim().is_empty() {
        return Err(ConfigError::Validation(
            "link-attribute cannot be empty".to_string(),
        ));
    }

    if config.page_unit_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "page-unit-marker cannot be empty".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates the ledger configuration
fn validate_ledger_config(config: &LedgerConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ledger path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the capture configuration
fn validate_capture_config(config: &CaptureConfig) -> Result<(), ConfigError> {
    if config.artifact_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "artifact-dir cannot be empty".to_string(),
        ));
    }

    if config.max_frames < 1 {
        return Err(ConfigError::Validation(format!(
            "max-frames must be >= 1, got {}",
            config.max_frames
        )));
    }

    let extension = config.image_extension.to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ConfigError::Validation(format!(
            "image-extension must be one of {:?}, got '{}'",
            SUPPORTED_EXTENSIONS, config.image_extension
        )));
    }

    Ok(())
}

/// Validates retry ceilings
fn validate_timing(timing: &Timing) -> Result<(), ConfigError> {
    if timing.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            timing.retry_attempts
        )));
    }
    Ok(())
}

/// Validates a CSS selector that is evaluated against captured page markup
fn validate_selector(name: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "{} cannot be empty",
            name
        )));
    }

    Selector::parse(selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("{} '{}' does not parse: {:?}", name, selector, e))
    })?;

    Ok(())
}
