//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `PagePosition`: current/total page numbers read from the listing
//! - `TraversalState`: the pagination controller's state machine states
//! - `Termination`: why a traversal stopped

mod position;
mod traversal;

// Re-export main types
pub use position::PagePosition;
pub use traversal::{Termination, TraversalState};
