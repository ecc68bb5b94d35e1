//! Scoped scratch storage for the three container segments.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Owns the scratch directory holding the header, frame-data, and index
/// segments of one pipeline run.
///
/// The directory is unique per run, so concurrent runs over different inputs
/// cannot collide, and it is deleted on every exit path (success or failure)
/// when this value drops.
#[derive(Debug)]
pub struct ScratchSegments {
    dir: TempDir,
    header: PathBuf,
    frames: PathBuf,
    index: PathBuf,
}

impl ScratchSegments {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("moshpit-").tempdir()?;
        let header = dir.path().join("hdrl.bin");
        let frames = dir.path().join("movi.bin");
        let index = dir.path().join("idx1.bin");
        Ok(ScratchSegments {
            dir,
            header,
            frames,
            index,
        })
    }

    /// Everything before the `movi` marker.
    pub fn header(&self) -> &Path {
        &self.header
    }

    /// From the `movi` marker up to the `idx1` marker.
    pub fn frames(&self) -> &Path {
        &self.frames
    }

    /// From the `idx1` marker to end of file.
    pub fn index(&self) -> &Path {
        &self.index
    }

    /// The scratch directory itself.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
