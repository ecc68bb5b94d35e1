//! # moshpit
//!
//! AVI databending: deliberately corrupt a file's temporal frame ordering
//! while keeping the container loadable by lenient players.
//!
//! The pipeline splits the input at its `movi` and `idx1` markers, indexes
//! the chunk tags inside the frame-data segment, drops anomalously large
//! entries, applies one of a closed set of glitch modes to the frame table,
//! and reassembles the file with the original header and index bytes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moshpit::{Glitcher, GlitchOptions};
//!
//! fn main() -> moshpit::Result<()> {
//!     let options = GlitchOptions::new()
//!         .input("dance.avi")
//!         .mode("bloom")
//!         .count(20)
//!         .span(3);
//!
//!     let mut glitcher = Glitcher::new(options)?;
//!     let written = glitcher.run()?;
//!     println!("wrote {}", written.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - `moshpit-avi`: marker-based segmentation, frame indexing, reassembly
//! - this crate: cleaning, glitch modes, pipeline orchestration
//! - `moshpit-cli`: the command-line tool

mod clean;
mod error;
mod modes;
mod options;
mod pipeline;

// Re-export the byte-layer types callers interact with.
pub use moshpit_avi::{markers, AviError, FourCC, FrameEntry, FrameKind};

pub use clean::clean_frames;
pub use error::{Error, Result};
pub use modes::{Mode, ModeSpec};
pub use options::GlitchOptions;
pub use pipeline::{GlitchStats, Glitcher};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
