//! Ledger error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or rewriting the ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Ledger header must have at least two columns: {}", .0.display())]
    MalformedHeader(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to replace ledger file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
