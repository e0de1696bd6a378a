// CLI module for audio2png
//
// Argument parsing, report output and the mapping from failures to process
// exit codes.

pub mod config;
pub mod output;

pub use config::Config;
pub use output::OutputFormatter;

use audio2png::ConvertError;

/// Wrong number of arguments or an invalid option
pub const EXIT_USAGE: i32 = 1;
/// Any failure not covered by a more specific code
pub const EXIT_FAILURE: i32 = 3;

/// Exit code for a failure, using the conversion stage when known
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ConvertError>()
        .map(ConvertError::exit_code)
        .unwrap_or(EXIT_FAILURE)
}

/// What the user can check for each kind of failure
pub fn hint(err: &anyhow::Error) -> Option<&'static str> {
    let hint = match err.downcast_ref::<ConvertError>()? {
        ConvertError::Launch { .. } => "make sure the ffmpeg path is correct and executable",
        ConvertError::AbnormalExit(_) => "make sure the input file exists and is a readable audio file",
        ConvertError::Interrupted => "the transcoder did not finish; try again",
        ConvertError::PipeRead(_) => "the transcoder output could not be read",
        ConvertError::OutputWrite { .. } => "make sure the output path is writable",
        ConvertError::Encode(_) => "the PNG encoder rejected the image data",
        ConvertError::PayloadTooLarge(_) => "the transcoded audio is larger than 4 GiB; use a shorter input or --quality",
    };
    Some(hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_survives_context() {
        let err = Err::<(), _>(ConvertError::AbnormalExit(1))
            .context("converting song.mp3")
            .unwrap_err();
        assert_eq!(exit_code(&err), 3);

        let err = Err::<(), _>(ConvertError::OutputWrite {
            path: PathBuf::from("out.png"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        })
        .context("converting song.mp3")
        .unwrap_err();
        assert_eq!(exit_code(&err), 4);
        assert!(hint(&err).unwrap().contains("writable"));
    }

    #[test]
    fn test_unknown_errors_use_generic_code() {
        let err = anyhow::anyhow!("stdout closed");
        assert_eq!(exit_code(&err), EXIT_FAILURE);
        assert!(hint(&err).is_none());
    }
}
