//! Folio: a resumable listing harvester and page capturer
//!
//! This crate walks a paginated listing in a live browser session, records
//! every result link in a checkpoint ledger, and later captures one composite
//! full-page image per recorded link. Both passes can be interrupted and
//! resumed without duplicating work.

pub mod browser;
pub mod capture;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] storage::LedgerError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Capture error: {0}")]
    Capture(#[from] capture::CaptureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Folio operations
pub type Result<T> = std::result::Result<T, FolioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{PagePosition, Termination, TraversalState};
pub use storage::{CheckpointLedger, LinkRecord};
