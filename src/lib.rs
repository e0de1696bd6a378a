//! audio2png - store audio as a picture
//!
//! An audio file is transcoded to Ogg Vorbis by an external transcoder
//! (normally ffmpeg) and the resulting byte stream is packed, losslessly,
//! into the pixels of a square RGBA PNG. The first pixel holds the stream
//! length as a big-endian `u32`, the stream follows in raster order and the
//! rest of the image is zero.
//!
//! ```no_run
//! use std::path::Path;
//! use audio2png::{convert, PngOptions, Transcoder};
//!
//! let transcoder = Transcoder::new("/usr/bin/ffmpeg");
//! let report = convert(
//!     Path::new("song.flac"),
//!     Path::new("song.png"),
//!     &transcoder,
//!     &PngOptions::default(),
//! )?;
//! println!("{}x{} image", report.side, report.side);
//! # Ok::<(), audio2png::ConvertError>(())
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

pub mod error;
pub mod pixel;
pub mod transcode;

pub use error::{ConvertError, ConvertResult};
pub use pixel::{
    CompressionLevel, ImageGeometry, PixelPacker, PngOptions, PngSink, RowSink, Scanlines,
};
pub use transcode::{CancelToken, TranscodeOptions, TranscodeResult, Transcoder};

/// Summary of a finished conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Bytes of Ogg Vorbis data stored in the image
    pub payload_bytes: usize,
    /// Width and height of the image
    pub side: u32,
    /// Size of the written PNG file
    pub png_bytes: u64,
    pub compression: CompressionLevel,
}

/// Transcode `input` and write it as a PNG to `output`
///
/// The output file is only created once transcoding has succeeded. If
/// writing fails part way through, the partial file is removed.
pub fn convert(
    input: &Path,
    output: &Path,
    transcoder: &Transcoder,
    options: &PngOptions,
) -> ConvertResult<ConversionReport> {
    let payload = transcoder.transcode(input)?;
    let geometry = write_png(&payload, output, options)?;

    // Size is informational; a failed stat does not fail the conversion
    let png_bytes = match fs::metadata(output) {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!("unable to stat {}: {}", output.display(), e);
            0
        }
    };

    info!(
        "wrote {} ({}x{}, {} payload bytes)",
        output.display(),
        geometry.side,
        geometry.side,
        payload.len()
    );

    Ok(ConversionReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        payload_bytes: payload.len(),
        side: geometry.side,
        png_bytes,
        compression: options.compression,
    })
}

/// Pack `payload` into a PNG file at `output`
pub fn write_png(payload: &[u8], output: &Path, options: &PngOptions) -> ConvertResult<ImageGeometry> {
    // Reject oversized payloads before touching the filesystem
    let packer = PixelPacker::new(payload)?;

    let output_error = |source: io::Error| ConvertError::OutputWrite {
        path: output.to_path_buf(),
        source,
    };

    let file = File::create(output).map_err(output_error)?;
    let mut writer = BufWriter::new(file);

    let written = PngSink::new(&mut writer, &packer.geometry(), options)
        .and_then(|sink| packer.pack_into(sink))
        .and_then(|()| writer.flush());

    if let Err(source) = written {
        drop(writer);
        if let Err(e) = fs::remove_file(output) {
            warn!("unable to remove partial output {}: {}", output.display(), e);
        }
        return Err(output_error(source));
    }

    Ok(packer.geometry())
}

/// Pack `payload` into a PNG written to `writer`
pub fn encode_png<W: Write>(payload: &[u8], writer: W, options: &PngOptions) -> ConvertResult<ImageGeometry> {
    let packer = PixelPacker::new(payload)?;
    let geometry = packer.geometry();

    PngSink::new(writer, &geometry, options)
        .and_then(|sink| packer.pack_into(sink))
        .map_err(ConvertError::Encode)?;

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_in_memory() {
        let mut buffer = Vec::new();
        let geometry = encode_png(b"hello", &mut buffer, &PngOptions::default()).unwrap();
        assert_eq!(geometry.side, 2);
        assert_eq!(&buffer[..8], b"\x89PNG\r\n\x1a\n");
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_encode_png_failure_names_no_path() {
        match encode_png(b"hello", FullDisk, &PngOptions::default()) {
            Err(err @ ConvertError::Encode(_)) => {
                assert_eq!(err.to_string(), "unable to encode PNG");
                assert_eq!(err.exit_code(), 4);
            }
            other => panic!("expected Encode, got {:?}", other),
        }
    }

    #[test]
    fn test_write_png_to_unwritable_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("missing-dir").join("out.png");
        match write_png(b"data", &output, &PngOptions::default()) {
            Err(ConvertError::OutputWrite { path, .. }) => assert_eq!(path, output),
            other => panic!("expected OutputWrite, got {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = ConversionReport {
            input: PathBuf::from("in.mp3"),
            output: PathBuf::from("out.png"),
            payload_bytes: 1234,
            side: 19,
            png_bytes: 1500,
            compression: CompressionLevel::Best,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["payload_bytes"], 1234);
        assert_eq!(json["side"], 19);
        assert_eq!(json["compression"], "best");
        assert_eq!(json["output"], "out.png");
    }
}
