// Output formatting for CLI

use anyhow::Result;
use clap::ValueEnum;
use std::io::Write;

use audio2png::ConversionReport;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable summary
    #[default]
    Pretty,
    /// Single-line JSON object
    Json,
}

/// Format and output conversion results
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output a finished conversion
    ///
    /// JSON is printed even in quiet mode since it was asked for explicitly.
    pub fn output_report(&self, report: &ConversionReport, writer: &mut impl Write) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(report)?)?;
            }
            OutputFormat::Pretty => {
                if self.quiet {
                    return Ok(());
                }
                writeln!(writer, "✓ {} -> {}", report.input.display(), report.output.display())?;
                writeln!(writer, "  payload: {} bytes of Ogg Vorbis", report.payload_bytes)?;
                writeln!(
                    writer,
                    "  image:   {}x{} RGBA, {} bytes ({:?} compression)",
                    report.side, report.side, report.png_bytes, report.compression
                )?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print a follow-up hint for an error
    pub fn print_hint(&self, hint: &str) {
        if !self.quiet {
            eprintln!("  {}", hint);
        }
    }
}
