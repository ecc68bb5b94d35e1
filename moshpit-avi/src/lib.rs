//! AVI byte layer for databending.
//!
//! This crate locates an AVI file's structural sections with fixed byte-marker
//! search (not a conformant RIFF parser), splits them into scratch segments,
//! indexes the video/audio chunk tags inside the frame-data segment, and
//! reassembles an output file from an arbitrary sequence of frame byte ranges.
//!
//! # Example
//!
//! ```no_run
//! use moshpit_avi::{markers, splitter, indexer, ScratchSegments};
//!
//! let scratch = ScratchSegments::new().unwrap();
//! let input = std::path::Path::new("clip.avi");
//!
//! let movi = splitter::copy_until_marker(input, scratch.header(), markers::MOVI, 0).unwrap();
//! let idx1 = splitter::copy_until_marker(input, scratch.frames(), markers::IDX1, movi).unwrap();
//! splitter::copy_remainder(input, scratch.index(), idx1).unwrap();
//!
//! let table = indexer::build_frame_table(scratch.frames(), false).unwrap();
//! println!("{} frames", table.len() - 1);
//! ```

mod chunks;
mod error;
pub mod indexer;
mod scratch;
pub mod splitter;
mod types;
pub mod writer;

pub use chunks::{markers, FourCC};
pub use error::{AviError, Result};
pub use scratch::ScratchSegments;
pub use types::{FrameEntry, FrameKind};
pub use writer::WriteCounts;
