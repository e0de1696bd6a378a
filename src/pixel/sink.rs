// Row sinks for packed scanlines

use std::convert::Infallible;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use crate::pixel::geometry::ImageGeometry;

/// Destination for fixed-width scanlines, written top to bottom
pub trait RowSink {
    /// Value produced once every row has been accepted
    type Output;
    type Error;

    /// Accept the next scanline
    fn write_row(&mut self, row: &[u8]) -> Result<(), Self::Error>;

    /// Signal that no more rows follow
    fn finish(self) -> Result<Self::Output, Self::Error>;
}

/// Raw concatenation of rows
impl RowSink for Vec<u8> {
    type Output = Vec<u8>;
    type Error = Infallible;

    fn write_row(&mut self, row: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(row);
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, Self::Error> {
        Ok(self)
    }
}

/// zlib effort used for the PNG image data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Fast,
    #[default]
    Default,
    Best,
}

impl From<CompressionLevel> for png::Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Fast => png::Compression::Fast,
            CompressionLevel::Default => png::Compression::Default,
            CompressionLevel::Best => png::Compression::Best,
        }
    }
}

/// PNG encoder settings
#[derive(Debug, Clone, Default)]
pub struct PngOptions {
    pub compression: CompressionLevel,
}

/// Collects scanlines and encodes them as an 8-bit RGBA PNG
///
/// The header is written up front; rows are held until `finish`, which
/// compresses the whole image and writes the closing chunks. Any `Write`
/// works, including borrowed writers.
pub struct PngSink<W: Write> {
    writer: png::Writer<W>,
    image: Vec<u8>,
}

impl<W: Write> PngSink<W> {
    /// Write the PNG header for a `side x side` image and prepare for rows
    pub fn new(writer: W, geometry: &ImageGeometry, options: &PngOptions) -> io::Result<Self> {
        let mut encoder = png::Encoder::new(writer, geometry.side, geometry.side);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(options.compression.into());

        let writer = encoder.write_header().map_err(encoding_error)?;

        Ok(PngSink {
            writer,
            image: Vec::with_capacity(geometry.total_bytes() as usize),
        })
    }
}

impl<W: Write> RowSink for PngSink<W> {
    type Output = ();
    type Error = io::Error;

    fn write_row(&mut self, row: &[u8]) -> io::Result<()> {
        self.image.extend_from_slice(row);
        Ok(())
    }

    /// Fails if the rows received do not add up to the full image
    fn finish(mut self) -> io::Result<()> {
        self.writer
            .write_image_data(&self.image)
            .map_err(encoding_error)?;
        self.writer.finish().map_err(encoding_error)
    }
}

fn encoding_error(err: png::EncodingError) -> io::Error {
    match err {
        png::EncodingError::IoError(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelPacker;

    #[test]
    fn test_vec_sink_concatenates_rows() {
        let mut sink = Vec::<u8>::new();
        sink.write_row(&[1, 2]).unwrap();
        sink.write_row(&[3, 4]).unwrap();
        assert_eq!(sink.finish().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_png_sink_writes_rgba_image() {
        let payload = b"OggS fake vorbis stream".to_vec();
        let packer = PixelPacker::new(&payload).unwrap();
        let geometry = packer.geometry();

        let mut png_bytes = Vec::new();
        let sink = PngSink::new(&mut png_bytes, &geometry, &PngOptions::default()).unwrap();
        packer.pack_into(sink).unwrap();

        let decoder = png::Decoder::new(png_bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut pixels).unwrap();

        assert_eq!(info.width, geometry.side);
        assert_eq!(info.height, geometry.side);
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(info.bit_depth, png::BitDepth::Eight);
        assert_eq!(&pixels[..4], &(payload.len() as u32).to_be_bytes());
        assert_eq!(&pixels[4..4 + payload.len()], &payload[..]);
    }

    #[test]
    fn test_png_sink_accepts_borrowed_writer() {
        let payload: Vec<u8> = (0..=255).collect();
        let packer = PixelPacker::new(&payload).unwrap();

        let mut file_like = std::io::BufWriter::new(Vec::new());
        let sink = PngSink::new(&mut file_like, &packer.geometry(), &PngOptions::default()).unwrap();
        packer.pack_into(sink).unwrap();
        file_like.flush().unwrap();

        let png_bytes = file_like.into_inner().unwrap();
        let mut reader = png::Decoder::new(png_bytes.as_slice()).read_info().unwrap();
        let mut pixels = vec![0; reader.output_buffer_size()];
        reader.next_frame(&mut pixels).unwrap();
        assert_eq!(&pixels[..4], &[0, 0, 1, 0]);
        assert_eq!(&pixels[4..260], &payload[..]);
    }

    #[test]
    fn test_png_sink_rejects_short_image() {
        let geometry = ImageGeometry::for_len(100).unwrap();
        let mut png_bytes = Vec::new();
        let mut sink = PngSink::new(&mut png_bytes, &geometry, &PngOptions::default()).unwrap();
        sink.write_row(&vec![0; geometry.row_bytes()]).unwrap();
        assert!(sink.finish().is_err());
    }

    #[test]
    fn test_every_compression_level_encodes() {
        let payload = vec![42u8; 1000];
        let packer = PixelPacker::new(&payload).unwrap();
        for compression in [CompressionLevel::Fast, CompressionLevel::Default, CompressionLevel::Best] {
            let mut png_bytes = Vec::new();
            let options = PngOptions { compression };
            let sink = PngSink::new(&mut png_bytes, &packer.geometry(), &options).unwrap();
            packer.pack_into(sink).unwrap();
            assert_eq!(&png_bytes[..8], b"\x89PNG\r\n\x1a\n");
        }
    }
}
