//! Glitch modes: the reordering/duplication transforms applied to the
//! cleaned frame table.

use crate::error::{Error, Result};
use moshpit_avi::FrameEntry;
use rand::seq::SliceRandom;
use rand::thread_rng;
use rand_distr::{Distribution, Normal};
use tracing::warn;

/// A frame-table transform, one closed variant per glitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Identity: output order equals input order.
    Void,
    /// Uniform one-shot permutation, unseeded.
    Random,
    /// Input in reverse order.
    Reverse,
    /// Adjacent pairs swapped; an unmatched tail is dropped.
    Invert,
    /// `count` copies of the entry at index `span`, inserted between the
    /// head `[..span]` and tail `[span..]`.
    Bloom { count: usize, span: usize },
    /// Every `span`-th entry repeated `count` times; others pass through.
    Pulse { count: usize, span: usize },
    /// Gaussian local reorder: output `i` takes input
    /// `clamp(i + round(N(0, count)), 0, len - 1)`.
    Jiggle { count: usize },
    /// Windows of length `count` starting every `span` entries, flattened.
    Overlap { count: usize, span: usize },
}

/// Outcome of resolving a mode name: the mode to run plus a user-visible
/// notice when the requested name degraded to [`Mode::Void`].
#[derive(Debug, Clone)]
pub struct ModeSpec {
    pub mode: Mode,
    pub notice: Option<String>,
}

impl Mode {
    /// Resolve a mode name and its parameters.
    ///
    /// Unimplemented or unrecognized names degrade to `Void` with a notice;
    /// degradation is never an error.
    pub fn resolve(name: &str, count: usize, span: usize) -> ModeSpec {
        let (mode, notice) = match name {
            "void" => (Mode::Void, None),
            "random" => (Mode::Random, None),
            "reverse" => (Mode::Reverse, None),
            "invert" => (Mode::Invert, None),
            "bloom" => (Mode::Bloom { count, span }, None),
            "pulse" => (Mode::Pulse { count, span }, None),
            "jiggle" => (Mode::Jiggle { count }, None),
            "overlap" => (Mode::Overlap { count, span }, None),
            "exponential" | "swap" => (
                Mode::Void,
                Some(format!("mode '{name}' is not implemented yet, using void")),
            ),
            other => (
                Mode::Void,
                Some(format!("unrecognized mode '{other}', using void")),
            ),
        };
        if let Some(ref notice) = notice {
            warn!("{notice}");
        }
        ModeSpec { mode, notice }
    }

    /// The canonical name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Void => "void",
            Mode::Random => "random",
            Mode::Reverse => "reverse",
            Mode::Invert => "invert",
            Mode::Bloom { .. } => "bloom",
            Mode::Pulse { .. } => "pulse",
            Mode::Jiggle { .. } => "jiggle",
            Mode::Overlap { .. } => "overlap",
        }
    }

    /// Apply this mode to a cleaned frame table.
    ///
    /// An empty table yields an empty output for every mode. Zero `span` or
    /// `count` where one is consumed fails fast, as does a bloom split point
    /// past the end of the table.
    pub fn apply(&self, frames: &[FrameEntry]) -> Result<Vec<FrameEntry>> {
        if frames.is_empty() {
            return Ok(Vec::new());
        }

        match *self {
            Mode::Void => Ok(frames.to_vec()),

            Mode::Random => {
                let mut out = frames.to_vec();
                out.shuffle(&mut thread_rng());
                Ok(out)
            }

            Mode::Reverse => Ok(frames.iter().rev().copied().collect()),

            Mode::Invert => {
                let odd = frames.iter().skip(1).step_by(2);
                let even = frames.iter().step_by(2);
                Ok(odd.zip(even).flat_map(|(a, b)| [*a, *b]).collect())
            }

            Mode::Bloom { count, span } => {
                check_count(count)?;
                if span == 0 || span >= frames.len() {
                    return Err(Error::invalid_param(format!(
                        "bloom span {span} out of range for {} frames",
                        frames.len()
                    )));
                }
                let mut out = Vec::with_capacity(frames.len() + count);
                out.extend_from_slice(&frames[..span]);
                out.extend(std::iter::repeat(frames[span]).take(count));
                out.extend_from_slice(&frames[span..]);
                Ok(out)
            }

            Mode::Pulse { count, span } => {
                check_count(count)?;
                check_span(span)?;
                Ok(frames
                    .iter()
                    .enumerate()
                    .flat_map(|(i, f)| {
                        let reps = if i % span == 0 { count } else { 1 };
                        std::iter::repeat(*f).take(reps)
                    })
                    .collect())
            }

            Mode::Jiggle { count } => {
                check_count(count)?;
                let normal = Normal::new(0.0, count as f64)
                    .map_err(|e| Error::invalid_param(format!("jiggle spread: {e}")))?;
                let mut rng = thread_rng();
                let last = (frames.len() - 1) as i64;
                Ok((0..frames.len())
                    .map(|i| {
                        let jitter = normal.sample(&mut rng).round() as i64;
                        let at = (i as i64 + jitter).clamp(0, last) as usize;
                        frames[at]
                    })
                    .collect())
            }

            Mode::Overlap { count, span } => {
                check_count(count)?;
                check_span(span)?;
                Ok((0..frames.len())
                    .step_by(span)
                    .flat_map(|start| {
                        let end = (start + count).min(frames.len());
                        frames[start..end].iter().copied()
                    })
                    .collect())
            }
        }
    }
}

fn check_span(span: usize) -> Result<()> {
    if span == 0 {
        return Err(Error::invalid_param("span must be at least 1"));
    }
    Ok(())
}

fn check_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::invalid_param("count must be at least 1"));
    }
    Ok(())
}
