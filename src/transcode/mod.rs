// Transcoder subprocess runner
//
// The transcoder is an external program (normally ffmpeg) that reads the input
// file and writes an Ogg Vorbis stream to its standard output. Its stdout is
// drained on a dedicated thread while the caller waits for the process to
// exit, so the process never blocks on a full pipe.

pub mod cancel;
pub mod reader;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

pub use cancel::CancelToken;
pub use reader::PipeReader;

use crate::error::{ConvertError, ConvertResult};

/// How often `run_cancellable` checks for exit or cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Outcome of one transcoder invocation
#[derive(Debug)]
pub enum TranscodeResult {
    /// The process exited with status 0; holds everything it wrote to stdout
    Success(Vec<u8>),
    /// The process could not be started
    LaunchFailure(io::Error),
    /// The process exited with a nonzero status
    AbnormalExit(i32),
    /// Waiting was interrupted, or the process was terminated by a signal
    Interrupted,
    /// The process succeeded but its output could not be read
    PipeReadFailure(io::Error),
}

impl TranscodeResult {
    /// Convert into the crate error type, naming `program` on launch failure
    pub fn into_result(self, program: &Path) -> ConvertResult<Vec<u8>> {
        match self {
            TranscodeResult::Success(bytes) => Ok(bytes),
            TranscodeResult::LaunchFailure(source) => Err(ConvertError::Launch {
                program: program.to_path_buf(),
                source,
            }),
            TranscodeResult::AbnormalExit(code) => Err(ConvertError::AbnormalExit(code)),
            TranscodeResult::Interrupted => Err(ConvertError::Interrupted),
            TranscodeResult::PipeReadFailure(e) => Err(ConvertError::PipeRead(e)),
        }
    }
}

/// Transcoder settings
#[derive(Debug, Clone, Default)]
pub struct TranscodeOptions {
    /// Vorbis VBR quality (`-q:a`), encoder default when unset
    pub quality: Option<f32>,
    /// Pass the transcoder's stderr through instead of discarding it
    pub inherit_stderr: bool,
}

/// An external audio transcoder
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: PathBuf,
    leading_args: Vec<OsString>,
    options: TranscodeOptions,
}

impl Transcoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Transcoder {
            program: program.into(),
            leading_args: Vec::new(),
            options: TranscodeOptions::default(),
        }
    }

    /// Arguments placed before the transcoding arguments
    ///
    /// Used when the program is a wrapper such as `nice` or a shell.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options(mut self, options: TranscodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Full argument list for transcoding `input` to Ogg Vorbis on stdout
    pub fn args(&self, input: &Path) -> Vec<OsString> {
        let mut args = self.leading_args.clone();
        args.push("-i".into());
        args.push(input.as_os_str().to_os_string());
        // Audio only, Ogg container, Vorbis codec
        args.extend(["-vn", "-f", "ogg", "-acodec", "libvorbis"].map(OsString::from));
        if let Some(quality) = self.options.quality {
            args.push("-q:a".into());
            args.push(quality.to_string().into());
        }
        args.push("pipe:".into());
        args
    }

    /// Run the transcoder to completion and collect its output
    ///
    /// The process and the reader thread have both finished by the time this
    /// returns, whatever the outcome.
    pub fn run(&self, input: &Path) -> TranscodeResult {
        let (mut child, reader) = match self.start(input) {
            Ok(started) => started,
            Err(result) => return result,
        };

        let status = child.wait();
        if status.is_err() {
            terminate(&mut child);
        }
        let output = reader.join();

        classify(status, output)
    }

    /// Like [`run`](Self::run), but stops early once `cancel` is triggered
    ///
    /// On cancellation the process is killed and reaped and the reader is
    /// joined before `Interrupted` is returned.
    ///
    /// Only the direct child is killed. The reader finishes once every holder
    /// of the stdout pipe has closed it, so a wrapper that leaves background
    /// processes attached to its stdout delays the return until they exit.
    /// Wrappers should `exec` the transcoder or redirect the output of
    /// anything they background.
    pub fn run_cancellable(&self, input: &Path, cancel: &CancelToken) -> TranscodeResult {
        let (mut child, reader) = match self.start(input) {
            Ok(started) => started,
            Err(result) => return result,
        };

        let status = loop {
            if cancel.is_cancelled() {
                info!("cancelling transcoder (pid {})", child.id());
                terminate(&mut child);
                if let Err(e) = reader.join() {
                    debug!("reader failed during cancellation: {}", e);
                }
                return TranscodeResult::Interrupted;
            }

            match child.try_wait() {
                Ok(Some(status)) => break Ok(status),
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    terminate(&mut child);
                    break Err(e);
                }
            }
        };
        let output = reader.join();

        classify(status, output)
    }

    /// Convenience wrapper: run and convert the outcome into a `Result`
    pub fn transcode(&self, input: &Path) -> ConvertResult<Vec<u8>> {
        self.run(input).into_result(&self.program)
    }

    fn start(&self, input: &Path) -> Result<(Child, PipeReader), TranscodeResult> {
        let args = self.args(input);
        info!("transcoding {} with {}", input.display(), self.program.display());
        debug!("transcoder arguments: {:?}", args);

        let stderr = if self.options.inherit_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|e| {
                warn!("failed to start {}: {}", self.program.display(), e);
                TranscodeResult::LaunchFailure(e)
            })?;

        let Some(stdout) = child.stdout.take() else {
            terminate(&mut child);
            return Err(TranscodeResult::PipeReadFailure(io::Error::other(
                "transcoder stdout was not captured",
            )));
        };

        match PipeReader::spawn(stdout) {
            Ok(reader) => Ok((child, reader)),
            Err(e) => {
                terminate(&mut child);
                Err(TranscodeResult::PipeReadFailure(e))
            }
        }
    }
}

/// Kill the child if it is still running and reap it
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill failed (process may have exited): {}", e);
    }
    if let Err(e) = child.wait() {
        warn!("unable to reap transcoder process: {}", e);
    }
}

fn classify(status: io::Result<ExitStatus>, output: io::Result<Vec<u8>>) -> TranscodeResult {
    let status = match status {
        Ok(status) => status,
        Err(e) => {
            warn!("waiting for transcoder failed: {}", e);
            return TranscodeResult::Interrupted;
        }
    };

    match status.code() {
        Some(0) => match output {
            Ok(bytes) => {
                info!("transcoder produced {} bytes", bytes.len());
                TranscodeResult::Success(bytes)
            }
            Err(e) => TranscodeResult::PipeReadFailure(e),
        },
        Some(code) => {
            warn!("transcoder exited with status {}", code);
            TranscodeResult::AbnormalExit(code)
        }
        None => {
            warn!("transcoder terminated without an exit status ({})", status);
            TranscodeResult::Interrupted
        }
    }
}
