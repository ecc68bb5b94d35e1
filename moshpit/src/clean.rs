//! Frame table cleaning.
//!
//! Raw tag scanning occasionally merges two real frames into one oversized
//! entry when a tag is missed, and the final entry can swallow trailing
//! container padding. The kill-ratio filter drops those without decoding
//! anything.

use crate::error::{Error, Result};
use moshpit_avi::FrameEntry;
use tracing::debug;

/// Filter a frame table by the kill ratio, optionally pinning the first
/// video frame to the head of the output.
///
/// Every entry whose size is at most `kill * max_size` is kept in order. The
/// pinned frame is included unconditionally and appears again in place if it
/// also passes the filter.
pub fn clean_frames(
    table: &[FrameEntry],
    kill: f32,
    keep_first_frame: bool,
) -> Result<Vec<FrameEntry>> {
    if !(0.0..=1.0).contains(&kill) {
        return Err(Error::invalid_param(format!(
            "kill ratio {kill} outside 0.0..=1.0"
        )));
    }

    let max_size = table.iter().map(|f| f.size).max().unwrap_or(0);
    let limit = max_size as f64 * kill as f64;

    let mut clean = Vec::with_capacity(table.len());
    if keep_first_frame {
        if let Some(first) = table.iter().find(|f| f.is_video()) {
            clean.push(*first);
        }
    }
    for frame in table {
        if frame.size as f64 <= limit {
            clean.push(*frame);
        }
    }

    debug!(
        "kept {} of {} entries (max size {}, kill {})",
        clean.len(),
        table.len(),
        max_size,
        kill
    );
    Ok(clean)
}
