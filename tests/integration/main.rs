//! Integration tests for both passes
//!
//! A fake site stands in for the browser, so the traversal and the capture
//! job run end-to-end against real ledger files and artifact directories.

mod capture_tests;
mod crawl_tests;
mod fake_page;

use fake_page::LISTING_URL;
use folio::config::{load_config, Config};
use std::path::Path;

/// Writes and loads a configuration rooted in `dir`, with zero delays
pub fn test_config(dir: &Path) -> Config {
    let ledger = dir.join("link.csv");
    let artifacts = dir.join("image");
    let config_path = dir.join("folio.toml");

    let content = format!(
        r#"
[browser]
headless = true
login-grace-secs = 0

[listing]
url = "{listing}"
results-selector = "div.results a[data-sns-link]"
link-attribute = "data-sns-link"
position-selector = "div.pagination span"
next-selector = "button.next"
max-pages = 50

[ledger]
path = "{ledger}"

[capture]
artifact-dir = "{artifacts}"
max-frames = 5

[timing]
retry-attempts = 3
retry-backoff-ms = 0
page-settle-ms = 0
after-advance-ms = 0
extended-wait-ms = 0
control-timeout-ms = 0
poll-interval-ms = 0
scroll-settle-ms = 0
media-timeout-ms = 0
link-load-ms = 0
between-links-ms = 0
"#,
        listing = LISTING_URL,
        ledger = ledger.display(),
        artifacts = artifacts.display(),
    );

    std::fs::write(&config_path, content).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}
