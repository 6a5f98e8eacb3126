//! Configuration module for Folio
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use folio::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("folio.toml")).unwrap();
//! println!("Listing will stop after at most {} pages", config.listing.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, CaptureConfig, Config, LedgerConfig, ListingConfig, Timing};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
