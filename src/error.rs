// Error types for audio2png
//
// Every variant is terminal for the current conversion. Nothing in the crate
// retries; the binary maps each variant to its own process exit status.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can end a conversion
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The transcoder executable could not be started
    #[error("unable to start transcoder '{}'", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The transcoder ran but exited with a nonzero status
    #[error("transcoder exited abnormally with status {0}")]
    AbnormalExit(i32),

    /// Waiting for the transcoder was interrupted before it finished
    #[error("transcoder process was interrupted")]
    Interrupted,

    /// Draining the transcoder's standard output failed
    #[error("unable to read from transcoder process")]
    PipeRead(#[source] io::Error),

    /// The PNG could not be written to its destination
    #[error("unable to write output file '{}'", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Encoding the PNG into a caller-supplied writer failed
    #[error("unable to encode PNG")]
    Encode(#[source] io::Error),

    /// The payload does not fit in the 32-bit length header
    #[error("payload of {0} bytes exceeds the {max} byte limit of the length header", max = u32::MAX)]
    PayloadTooLarge(usize),
}

impl ConvertError {
    /// Process exit status reported by the command-line tool
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Launch { .. } => 2,
            ConvertError::AbnormalExit(_)
            | ConvertError::Interrupted
            | ConvertError::PayloadTooLarge(_) => 3,
            ConvertError::OutputWrite { .. } | ConvertError::Encode(_) => 4,
            ConvertError::PipeRead(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_per_stage() {
        let launch = ConvertError::Launch {
            program: PathBuf::from("ffmpeg"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        let write = ConvertError::OutputWrite {
            path: PathBuf::from("out.png"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };

        assert_eq!(launch.exit_code(), 2);
        assert_eq!(ConvertError::AbnormalExit(1).exit_code(), 3);
        assert_eq!(ConvertError::Interrupted.exit_code(), 3);
        assert_eq!(ConvertError::PayloadTooLarge(usize::MAX).exit_code(), 3);
        assert_eq!(write.exit_code(), 4);
        assert_eq!(
            ConvertError::Encode(io::Error::from(io::ErrorKind::WriteZero)).exit_code(),
            4
        );
        assert_eq!(
            ConvertError::PipeRead(io::Error::from(io::ErrorKind::BrokenPipe)).exit_code(),
            5
        );
    }

    #[test]
    fn test_messages_name_the_failing_path() {
        let err = ConvertError::Launch {
            program: PathBuf::from("/opt/ffmpeg/bin/ffmpeg"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/opt/ffmpeg/bin/ffmpeg"));

        let err = ConvertError::OutputWrite {
            path: PathBuf::from("/readonly/out.png"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/readonly/out.png"));
    }

    #[test]
    fn test_cause_is_reported_once_in_chain() {
        use std::error::Error as _;

        let err = ConvertError::Launch {
            program: PathBuf::from("ffmpeg"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(!err.to_string().contains("no such file"));
        assert_eq!(err.source().unwrap().to_string(), "no such file");

        let chained = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chained.matches("no such file").count(), 1);

        let err = ConvertError::PipeRead(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
        let chained = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chained, "unable to read from transcoder process: pipe closed");
    }
}
