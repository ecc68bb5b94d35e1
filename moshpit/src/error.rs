//! Error types for the glitch pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the glitch pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Container segmentation, indexing, or reassembly failed.
    #[error(transparent)]
    Avi(#[from] moshpit_avi::AviError),

    /// IO error outside the AVI layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid mode parameter or option value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input file does not exist.
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }
}
