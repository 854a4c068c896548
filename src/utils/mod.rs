//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Output filename sanitization
//! - Workspace maintenance

pub mod error;
pub mod filename;
pub mod workspace;

// Re-export commonly used items
pub use error::{DocumentError, DocumentResult};
pub use filename::sanitize_filename;
pub use workspace::{clear_workspace, ensure_workspace, remove_stale_outputs};
