//! Glitch run options.

use std::path::PathBuf;

/// Options for one glitch run, using the builder pattern.
#[derive(Debug, Clone)]
pub struct GlitchOptions {
    /// Input AVI file.
    pub input: Option<PathBuf>,
    /// Mode name; unimplemented names degrade to `void`.
    pub mode: String,
    /// How many frames each glitch uses (mode-dependent).
    pub count: usize,
    /// How often the glitch recurs (mode-dependent).
    pub span: usize,
    /// Largest frame kept, as a fraction of the largest observed size.
    pub kill: f32,
    /// Index audio chunks too, attempting to preserve audio.
    pub keep_audio: bool,
    /// Pin the first video frame to the head of the output.
    pub keep_first_frame: bool,
    /// Explicit output path; defaults to a name derived from the input.
    pub output: Option<PathBuf>,
}

impl Default for GlitchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl GlitchOptions {
    /// Create options with the tool's defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: None,
            mode: "void".into(),
            count: 1,
            span: 1,
            kill: 0.7,
            keep_audio: false,
            keep_first_frame: false,
            output: None,
        }
    }

    /// Set the input file path.
    #[must_use]
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set the mode by name.
    #[must_use]
    pub fn mode(mut self, name: impl Into<String>) -> Self {
        self.mode = name.into();
        self
    }

    /// Set the count parameter.
    #[must_use]
    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set the span parameter.
    #[must_use]
    pub fn span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    /// Set the kill ratio.
    #[must_use]
    pub fn kill(mut self, kill: f32) -> Self {
        self.kill = kill;
        self
    }

    /// Index audio chunks too.
    #[must_use]
    pub fn keep_audio(mut self, keep: bool) -> Self {
        self.keep_audio = keep;
        self
    }

    /// Pin the first video frame.
    #[must_use]
    pub fn keep_first_frame(mut self, keep: bool) -> Self {
        self.keep_first_frame = keep;
        self
    }

    /// Set an explicit output path.
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Validate the options.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.is_none() {
            return Err("input file not specified".into());
        }
        if self.count == 0 {
            return Err("count must be a positive integer".into());
        }
        if self.span == 0 {
            return Err("span must be a positive integer".into());
        }
        if !(0.0..=1.0).contains(&self.kill) {
            return Err(format!("kill ratio {} outside 0.0..=1.0", self.kill));
        }
        Ok(())
    }
}
