//! The glitch pipeline: split, index, clean, transform, reassemble.

use crate::clean::clean_frames;
use crate::error::{Error, Result};
use crate::modes::{Mode, ModeSpec};
use crate::options::GlitchOptions;
use moshpit_avi::{indexer, markers, splitter, writer, ScratchSegments};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Statistics from one glitch run.
#[derive(Debug, Clone, Default)]
pub struct GlitchStats {
    /// Frames discovered by the indexer (sentinel excluded).
    pub frames_indexed: usize,
    /// Entries surviving the cleaner (sentinel and pins included).
    pub frames_kept: usize,
    /// Entries whose bytes were written to the output.
    pub frames_written: usize,
    /// Sentinel entries skipped during reassembly.
    pub frames_skipped: usize,
    /// Header segment bytes.
    pub header_bytes: u64,
    /// Frame bytes written (sum of the written entries' sizes).
    pub frame_bytes: u64,
    /// Index segment bytes.
    pub index_bytes: u64,
    /// Input file size.
    pub input_size: u64,
    /// Output file size.
    pub output_size: u64,
}

impl GlitchStats {
    /// Output size relative to input size. Duplicating modes run over 1.0,
    /// dropping modes under.
    pub fn expansion_ratio(&self) -> f64 {
        if self.input_size > 0 && self.output_size > 0 {
            self.output_size as f64 / self.input_size as f64
        } else {
            1.0
        }
    }
}

/// Runs the five pipeline stages over one input file.
pub struct Glitcher {
    options: GlitchOptions,
    mode: ModeSpec,
    stats: GlitchStats,
}

impl Glitcher {
    /// Create a glitcher, validating options and resolving the mode name.
    pub fn new(options: GlitchOptions) -> Result<Self> {
        options.validate().map_err(Error::InvalidParameter)?;
        let mode = Mode::resolve(&options.mode, options.count, options.span);
        Ok(Self {
            options,
            mode,
            stats: GlitchStats::default(),
        })
    }

    /// The resolved mode, including any degradation notice.
    pub fn mode(&self) -> &ModeSpec {
        &self.mode
    }

    /// Statistics from the last run.
    pub fn stats(&self) -> &GlitchStats {
        &self.stats
    }

    /// The options this glitcher runs with.
    pub fn options(&self) -> &GlitchOptions {
        &self.options
    }

    /// Where the output will be written: the explicit override, or a name
    /// derived from the input, requested mode, and non-default parameters.
    pub fn output_path(&self) -> PathBuf {
        if let Some(ref out) = self.options.output {
            return out.clone();
        }
        let input = self.options.input.as_deref().unwrap_or(Path::new("output"));
        derived_output(
            input,
            &self.options.mode,
            self.options.count,
            self.options.span,
        )
    }

    /// Run the pipeline and return the written output path.
    ///
    /// Stages run strictly in sequence; any failure aborts the run and the
    /// scratch directory is removed on the way out.
    pub fn run(&mut self) -> Result<PathBuf> {
        let input = self
            .options
            .input
            .clone()
            .ok_or_else(|| Error::invalid_param("input file not specified"))?;
        if !input.is_file() {
            return Err(Error::InputNotFound(input));
        }
        self.stats = GlitchStats {
            input_size: fs::metadata(&input)?.len(),
            ..GlitchStats::default()
        };

        info!(
            "glitching {} with mode {}",
            input.display(),
            self.mode.mode.name()
        );
        splitter::probe_riff(&input)?;

        let scratch = ScratchSegments::new()?;
        let movi_pos = splitter::copy_until_marker(&input, scratch.header(), markers::MOVI, 0)?;
        let idx1_pos =
            splitter::copy_until_marker(&input, scratch.frames(), markers::IDX1, movi_pos)?;
        splitter::copy_remainder(&input, scratch.index(), idx1_pos)?;
        info!("split segments at movi={}, idx1={}", movi_pos, idx1_pos);

        let table = indexer::build_frame_table(scratch.frames(), self.options.keep_audio)?;
        self.stats.frames_indexed = table.iter().filter(|f| !f.is_sentinel()).count();
        info!("indexed {} frames", self.stats.frames_indexed);

        let clean = clean_frames(&table, self.options.kill, self.options.keep_first_frame)?;
        self.stats.frames_kept = clean.len();

        let sequence = self.mode.mode.apply(&clean)?;
        debug!("transformed sequence holds {} entries", sequence.len());

        let output = self.output_path();
        let counts = writer::assemble(
            &output,
            scratch.header(),
            scratch.frames(),
            scratch.index(),
            &sequence,
        )?;
        self.stats.frames_written = counts.frames_written;
        self.stats.frames_skipped = counts.frames_skipped;
        self.stats.header_bytes = counts.header_bytes;
        self.stats.frame_bytes = counts.frame_bytes;
        self.stats.index_bytes = counts.index_bytes;
        self.stats.output_size = fs::metadata(&output)?.len();

        info!(
            "wrote {} frames to {} ({} bytes)",
            self.stats.frames_written,
            output.display(),
            self.stats.output_size
        );
        Ok(output)
    }
}

/// `<stem>-<mode>[-c<count>][-n<span>].avi` beside the input, suffixes only
/// for non-default parameter values.
fn derived_output(input: &Path, mode: &str, count: usize, span: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    let cname = if count > 1 {
        format!("-c{count}")
    } else {
        String::new()
    };
    let nname = if span > 1 {
        format!("-n{span}")
    } else {
        String::new()
    };
    input.with_file_name(format!("{stem}-{mode}{cname}{nname}.avi"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_output_plain() {
        let out = derived_output(Path::new("/clips/dance.avi"), "reverse", 1, 1);
        assert_eq!(out, Path::new("/clips/dance-reverse.avi"));
    }

    #[test]
    fn test_derived_output_with_parameters() {
        let out = derived_output(Path::new("dance.avi"), "bloom", 20, 3);
        assert_eq!(out, Path::new("dance-bloom-c20-n3.avi"));
    }

    #[test]
    fn test_explicit_output_wins() {
        let glitcher = Glitcher::new(
            GlitchOptions::new()
                .input("clip.avi")
                .mode("pulse")
                .output("/tmp/custom.avi"),
        )
        .unwrap();
        assert_eq!(glitcher.output_path(), Path::new("/tmp/custom.avi"));
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        assert!(Glitcher::new(GlitchOptions::new()).is_err());
        assert!(Glitcher::new(GlitchOptions::new().input("a.avi").span(0)).is_err());
    }

    #[test]
    fn test_run_requires_existing_input() {
        let mut glitcher =
            Glitcher::new(GlitchOptions::new().input("/no/such/clip.avi")).unwrap();
        assert!(matches!(
            glitcher.run().unwrap_err(),
            Error::InputNotFound(_)
        ));
    }

    #[test]
    fn test_expansion_ratio() {
        let stats = GlitchStats {
            input_size: 100,
            output_size: 150,
            ..Default::default()
        };
        assert!((stats.expansion_ratio() - 1.5).abs() < f64::EPSILON);
        assert_eq!(GlitchStats::default().expansion_ratio(), 1.0);
    }
}
