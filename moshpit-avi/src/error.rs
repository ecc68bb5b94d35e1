//! Error types for the AVI byte layer.

use crate::chunks::FourCC;
use thiserror::Error;

/// Result type for AVI segment operations.
pub type Result<T> = std::result::Result<T, AviError>;

/// Errors that can occur while splitting, indexing, or reassembling.
#[derive(Error, Debug)]
pub enum AviError {
    /// IO error during read/write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested split marker does not occur in the scanned region.
    #[error("marker '{marker}' not found after byte {start}")]
    MarkerNotFound { marker: FourCC, start: u64 },

    /// A frame's byte range extends past the end of its segment.
    #[error("frame at offset {offset} truncated: expected {expected} bytes, segment had {got}")]
    ShortRead { offset: u64, expected: u64, got: u64 },
}
