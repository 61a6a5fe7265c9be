//! Error types for Gridmark core.
//!
//! Interaction gestures never fail; these errors only arise at the edges
//! where a host feeds data in (refresh, snapshot decoding, configuration).

use thiserror::Error;

/// Errors surfaced by the host-facing parts of the core.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Refresh failed: {0}")]
    Refresh(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
