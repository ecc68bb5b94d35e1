//! Moshpit CLI - command-line interface for AVI databending.

use clap::Parser;
use console::style;
use glob::glob;
use moshpit::{GlitchOptions, GlitchStats, Glitcher};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::warn;

/// Output mode for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    /// Normal output with banner and stats.
    Normal,
    /// JSON output for programmatic parsing.
    Json,
    /// Quiet mode; only the output path is printed.
    Quiet,
    /// Verbose mode with per-section byte counts.
    Verbose,
}

/// Command-line arguments for the moshpit tool.
#[derive(Parser, Debug)]
#[command(name = "moshpit")]
#[command(version)]
#[command(about = "Audio Video Interleave breaker - glitch AVI files by reordering frames")]
#[command(long_about = "Moshpit databends AVI files: it reorders, duplicates, and drops\n\
    frames inside the container without decoding them, producing datamosh-style\n\
    visual artifacts while the file stays playable in lenient players.\n\n\
    EXAMPLES:\n    \
    moshpit -i clip.avi -m random\n    \
    moshpit -i clip.avi -m bloom -c 20 -n 3\n    \
    moshpit -i clip.avi -m pulse -c 4 -n 8 --firstframe\n    \
    moshpit -m reverse --batch 'captures/*.avi'")]
struct Args {
    /// Input AVI file
    #[arg(short, long, required_unless_present = "batch")]
    input: Option<PathBuf>,

    /// Glitch mode (void, random, reverse, invert, bloom, pulse, jiggle, overlap)
    #[arg(short, long, default_value = "void")]
    mode: String,

    /// How many frames each glitch uses (bloom/pulse repeats, overlap window,
    /// jiggle spread)
    #[arg(short, long, default_value = "1")]
    count: usize,

    /// How often the glitch recurs (bloom split point, pulse/overlap stride)
    #[arg(short = 'n', long, default_value = "1")]
    span: usize,

    /// Attempt to preserve audio by indexing audio chunks too
    #[arg(short, long)]
    audio: bool,

    /// Keep the first video frame at the head of the output
    #[arg(long)]
    firstframe: bool,

    /// Largest frame kept while cleaning, as a fraction of the largest
    /// observed frame size
    #[arg(short, long, default_value = "0.7")]
    kill: f32,

    /// Output file path (default: derived from the input name and mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output with per-section byte counts
    #[arg(short, long, conflicts_with = "quiet", conflicts_with = "json")]
    verbose: bool,

    /// Quiet mode (only print the output path on success)
    #[arg(short, long, conflicts_with = "verbose", conflicts_with = "json")]
    quiet: bool,

    /// JSON output mode for programmatic parsing
    #[arg(long, conflicts_with = "verbose", conflicts_with = "quiet")]
    json: bool,

    /// Batch mode: glitch every file matching a glob pattern
    #[arg(long)]
    batch: Option<String>,
}

impl Args {
    /// Determine the output mode based on flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else if self.verbose {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }

    /// Build library options for one input file.
    fn glitch_options(&self, input: &Path) -> GlitchOptions {
        let mut options = GlitchOptions::new()
            .input(input)
            .mode(&self.mode)
            .count(self.count)
            .span(self.span)
            .kill(self.kill)
            .keep_audio(self.audio)
            .keep_first_frame(self.firstframe);
        if let Some(ref output) = self.output {
            options = options.output(output);
        }
        options
    }
}

/// JSON completion output structure.
#[derive(Debug, Clone, Serialize)]
struct JsonCompleteOutput {
    /// Type of message.
    #[serde(rename = "type")]
    msg_type: String,
    /// Whether the run was successful.
    success: bool,
    /// Written output file.
    output: String,
    /// Final statistics.
    stats: JsonStats,
}

/// Run statistics for JSON output.
#[derive(Debug, Clone, Serialize)]
struct JsonStats {
    frames_indexed: usize,
    frames_kept: usize,
    frames_written: usize,
    input_size_bytes: u64,
    output_size_bytes: u64,
    expansion_ratio: f64,
    elapsed_seconds: f64,
}

impl JsonStats {
    fn new(stats: &GlitchStats, elapsed: Duration) -> Self {
        JsonStats {
            frames_indexed: stats.frames_indexed,
            frames_kept: stats.frames_kept,
            frames_written: stats.frames_written,
            input_size_bytes: stats.input_size,
            output_size_bytes: stats.output_size,
            expansion_ratio: stats.expansion_ratio(),
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let output_mode = args.output_mode();

    // Initialize logging (not in JSON or quiet mode)
    if output_mode != OutputMode::Json && output_mode != OutputMode::Quiet {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(if args.verbose {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            })
            .with_target(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    if output_mode == OutputMode::Normal || output_mode == OutputMode::Verbose {
        print_header();
    }

    // Batch mode handles its own reporting and exit code.
    if let Some(ref pattern) = args.batch {
        return process_batch(&args, pattern, output_mode);
    }

    let input = args
        .input
        .clone()
        .expect("clap requires --input without --batch");

    if !input.is_file() {
        fail(
            output_mode,
            "input_not_found",
            &format!("Input file not found: {}", input.display()),
        );
    }

    let mut glitcher = match Glitcher::new(args.glitch_options(&input)) {
        Ok(g) => g,
        Err(e) => fail(output_mode, "invalid_options", &e.to_string()),
    };

    if output_mode == OutputMode::Normal || output_mode == OutputMode::Verbose {
        println!();
        println!("{}", style("Configuration:").cyan().bold());
        println!("  Input:       {}", style(input.display()).white());
        println!("  Mode:        {}", style(&args.mode).white());
        if args.count > 1 {
            println!("  Count:       {}", style(args.count).white());
        }
        if args.span > 1 {
            println!("  Span:        {}", style(args.span).white());
        }
        println!("  Kill ratio:  {}", style(args.kill).white());
        if args.audio {
            println!("  Audio:       preserved");
        }
        if args.firstframe {
            println!("  First frame: pinned");
        }
        if let Some(ref notice) = glitcher.mode().notice {
            println!("  {} {}", style("Notice:").yellow().bold(), notice);
        }
        println!();
    }

    if output_mode == OutputMode::Json {
        let start = serde_json::json!({
            "type": "start",
            "input": input.to_string_lossy(),
            "mode": args.mode,
            "count": args.count,
            "span": args.span,
        });
        println!("{}", start);
    }

    let start = Instant::now();
    let result = glitcher.run();
    let elapsed = start.elapsed();

    match result {
        Ok(output) => {
            report_success(&args, output_mode, &glitcher, &output, elapsed);
            Ok(())
        }
        Err(e) => fail(output_mode, "glitch_failed", &e.to_string()),
    }
}

/// Report a failure in the requested format and exit with code 1.
fn fail(output_mode: OutputMode, code: &str, message: &str) -> ! {
    match output_mode {
        OutputMode::Json => {
            let error = serde_json::json!({
                "type": "error",
                "error": code,
                "message": message,
            });
            println!("{}", error);
        }
        OutputMode::Quiet => {}
        _ => eprintln!("{} {}", style("Error:").red().bold(), message),
    }
    std::process::exit(1);
}

/// Print results for a successful run.
fn report_success(
    args: &Args,
    output_mode: OutputMode,
    glitcher: &Glitcher,
    output: &Path,
    elapsed: Duration,
) {
    let stats = glitcher.stats();

    match output_mode {
        OutputMode::Json => {
            let complete = JsonCompleteOutput {
                msg_type: "complete".to_string(),
                success: true,
                output: output.to_string_lossy().into_owned(),
                stats: JsonStats::new(stats, elapsed),
            };
            if let Ok(json) = serde_json::to_string(&complete) {
                println!("{}", json);
            }
        }
        OutputMode::Quiet => {
            println!("{}", output.display());
        }
        OutputMode::Normal | OutputMode::Verbose => {
            println!("{}", style("Glitch complete!").green().bold());
            println!();
            println!("{}", style("Statistics:").cyan().bold());
            println!("  Frames indexed:  {}", stats.frames_indexed);
            println!("  Frames kept:     {}", stats.frames_kept);
            println!("  Frames written:  {}", stats.frames_written);
            println!("  Input size:      {}", format_size(stats.input_size));
            println!("  Output size:     {}", format_size(stats.output_size));
            println!(
                "  Expansion:       {}",
                style(format!("{:.2}x", stats.expansion_ratio())).yellow()
            );
            println!("  Time elapsed:    {:.2?}", elapsed);

            if output_mode == OutputMode::Verbose {
                println!();
                println!("{}", style("Sections:").cyan().bold());
                println!("  Header bytes:    {}", stats.header_bytes);
                println!("  Frame bytes:     {}", stats.frame_bytes);
                println!("  Index bytes:     {}", stats.index_bytes);
                println!("  Entries skipped: {}", stats.frames_skipped);
                if args.mode == "random" || args.mode == "jiggle" {
                    println!("  (unseeded; every run shuffles differently)");
                }
            }

            println!();
            println!(
                "{} {}",
                style("Output saved to:").white(),
                style(output.display()).green().bold()
            );
        }
    }
}

/// Batch processing result.
#[derive(Debug)]
struct BatchResult {
    input: PathBuf,
    outcome: Result<PathBuf, String>,
    elapsed: Duration,
}

/// Glitch every file matching the pattern with the same parameters.
fn process_batch(args: &Args, pattern: &str, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("error matching pattern: {}", e),
        }
    }

    if files.is_empty() {
        fail(
            output_mode,
            "batch_empty",
            &format!("No files found matching pattern: {}", pattern),
        );
    }

    if output_mode == OutputMode::Normal || output_mode == OutputMode::Verbose {
        println!();
        println!(
            "{} {} files, mode {}",
            style("Batch:").cyan().bold(),
            files.len(),
            style(&args.mode).white()
        );
        println!();
    }

    let mut results = Vec::new();
    for input in files {
        let start = Instant::now();
        let outcome = Glitcher::new(args.glitch_options(&input))
            .and_then(|mut g| g.run())
            .map_err(|e| e.to_string());
        let elapsed = start.elapsed();

        match (&outcome, output_mode) {
            (Ok(output), OutputMode::Normal | OutputMode::Verbose) => println!(
                "  {} {} -> {} ({:.2?})",
                style("ok").green(),
                input.display(),
                output.display(),
                elapsed
            ),
            (Ok(output), OutputMode::Quiet) => println!("{}", output.display()),
            (Err(e), OutputMode::Normal | OutputMode::Verbose) => {
                println!("  {} {} - {}", style("failed").red(), input.display(), e)
            }
            _ => {}
        }
        results.push(BatchResult {
            input,
            outcome,
            elapsed,
        });
    }

    let failed: Vec<&BatchResult> = results.iter().filter(|r| r.outcome.is_err()).collect();
    let total_time: Duration = results.iter().map(|r| r.elapsed).sum();

    if output_mode == OutputMode::Json {
        let summary = serde_json::json!({
            "type": "batch_complete",
            "total": results.len(),
            "success": results.len() - failed.len(),
            "failed": failed.len(),
            "elapsed_seconds": total_time.as_secs_f64(),
        });
        println!("{}", summary);
    } else if output_mode != OutputMode::Quiet {
        println!();
        println!("{}", style("Batch complete:").cyan().bold());
        println!("  Total:    {} files", results.len());
        println!(
            "  Success:  {}",
            style(results.len() - failed.len()).green()
        );
        if !failed.is_empty() {
            println!("  Failed:   {}", style(failed.len()).red());
            for r in &failed {
                println!("    {}", r.input.display());
            }
        }
        println!("  Time:     {:.2?}", total_time);
    }

    if !failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("+--------------------------------------------------+").cyan()
    );
    println!(
        "{}  {}{}",
        style("|").cyan(),
        style("MOSHPIT").cyan().bold(),
        style("                                         |").cyan()
    );
    println!(
        "{}  {}  {}",
        style("|").cyan(),
        style("Audio Video Interleave breaker").white(),
        style("                |").cyan()
    );
    println!(
        "{}",
        style("+--------------------------------------------------+").cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            input: Some(PathBuf::from("clip.avi")),
            mode: "void".to_string(),
            count: 1,
            span: 1,
            audio: false,
            firstframe: false,
            kill: 0.7,
            output: None,
            verbose: false,
            quiet: false,
            json: false,
            batch: None,
        }
    }

    // ===== OutputMode tests =====

    #[test]
    fn test_output_mode_default() {
        assert_eq!(base_args().output_mode(), OutputMode::Normal);
    }

    #[test]
    fn test_output_mode_json() {
        let args = Args {
            json: true,
            ..base_args()
        };
        assert_eq!(args.output_mode(), OutputMode::Json);
    }

    #[test]
    fn test_output_mode_quiet() {
        let args = Args {
            quiet: true,
            ..base_args()
        };
        assert_eq!(args.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn test_output_mode_verbose() {
        let args = Args {
            verbose: true,
            ..base_args()
        };
        assert_eq!(args.output_mode(), OutputMode::Verbose);
    }

    // ===== glitch_options tests =====

    #[test]
    fn test_glitch_options_mapping() {
        let args = Args {
            mode: "bloom".to_string(),
            count: 12,
            span: 4,
            audio: true,
            firstframe: true,
            kill: 0.9,
            ..base_args()
        };
        let opts = args.glitch_options(Path::new("clip.avi"));
        assert_eq!(opts.mode, "bloom");
        assert_eq!(opts.count, 12);
        assert_eq!(opts.span, 4);
        assert!(opts.keep_audio);
        assert!(opts.keep_first_frame);
        assert!(opts.validate().is_ok());
    }

    // ===== format_size tests =====

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_kilobytes() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
    }

    #[test]
    fn test_format_size_megabytes() {
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_format_size_gigabytes() {
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.00 GB");
    }

    // ===== JsonStats tests =====

    #[test]
    fn test_json_stats_serialization() {
        let stats = GlitchStats {
            frames_indexed: 120,
            frames_kept: 110,
            frames_written: 109,
            input_size: 2048,
            output_size: 4096,
            ..Default::default()
        };
        let json = JsonStats::new(&stats, Duration::from_millis(250));
        let text = serde_json::to_string(&json).unwrap();
        assert!(text.contains("\"frames_indexed\":120"));
        assert!(text.contains("\"output_size_bytes\":4096"));
        assert!(text.contains("\"expansion_ratio\":2.0"));
    }
}
