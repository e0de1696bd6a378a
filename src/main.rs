// CLI binary entry point for audio2png
//
// Usage: audio2png <INPUT> <OUTPUT> <FFMPEG>
//
// Exit codes: 1 bad arguments, 2 transcoder could not start, 3 conversion
// failed, 4 output not writable, 5 transcoder output could not be read.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process;

use cli::{Config, OutputFormatter};

fn main() {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) => {
            // --help and --version also come through here
            let code = if e.use_stderr() { cli::EXIT_USAGE } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter())).init();

    let formatter = OutputFormatter::new(config.format, config.quiet);
    if let Err(err) = run(&config, &formatter) {
        formatter.print_error(&format!("{:#}", err));
        if let Some(hint) = cli::hint(&err) {
            formatter.print_hint(hint);
        }
        process::exit(cli::exit_code(&err));
    }
}

fn run(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let report = audio2png::convert(
        &config.input,
        &config.output,
        &config.transcoder(),
        &config.png_options(),
    )
    .with_context(|| format!("converting {}", config.input.display()))?;

    formatter
        .output_report(&report, &mut io::stdout().lock())
        .context("unable to print report")?;

    Ok(())
}
