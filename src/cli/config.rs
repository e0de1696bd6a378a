// CLI configuration
use clap::Parser;
use std::path::PathBuf;

use audio2png::{CompressionLevel, PngOptions, TranscodeOptions, Transcoder};

use crate::cli::output::OutputFormat;

/// audio2png - store audio inside a PNG image
#[derive(Parser, Debug)]
#[command(name = "audio2png")]
#[command(about = "Transcode an audio file to Ogg Vorbis and embed the stream in a square PNG", long_about = None)]
#[command(version)]
pub struct Config {
    /// Audio file to convert
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// PNG file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Path to the ffmpeg executable
    #[arg(value_name = "FFMPEG")]
    pub transcoder: PathBuf,

    /// Vorbis quality, -1 (smallest) to 10 (best)
    #[arg(long, value_parser = parse_quality, allow_negative_numbers = true)]
    pub quality: Option<f32>,

    /// PNG compression effort
    #[arg(short, long, value_enum, default_value = "default")]
    pub compression: CompressionLevel,

    /// Report format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Quiet mode (only errors are printed)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug logging and transcoder diagnostics)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Build the transcoder described by the arguments
    pub fn transcoder(&self) -> Transcoder {
        Transcoder::new(&self.transcoder).with_options(TranscodeOptions {
            quality: self.quality,
            inherit_stderr: self.verbose,
        })
    }

    pub fn png_options(&self) -> PngOptions {
        PngOptions {
            compression: self.compression,
        }
    }

    /// Default log filter, overridable through RUST_LOG
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

/// Parse and range-check a Vorbis quality value
fn parse_quality(value: &str) -> Result<f32, String> {
    let quality: f32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (-1.0..=10.0).contains(&quality) {
        Ok(quality)
    } else {
        Err(format!("quality must be between -1 and 10, got {}", quality))
    }
}
