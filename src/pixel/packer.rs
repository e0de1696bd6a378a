// Byte-to-pixel packing
//
// Layout: pixel (0, 0) holds the payload length big-endian, the payload
// follows in row-major, channel-major order, and every channel after the
// payload is zero. Decoders depend on this traversal order.

use log::debug;

use crate::error::ConvertResult;
use crate::pixel::geometry::ImageGeometry;
use crate::pixel::sink::RowSink;
use crate::pixel::CHANNELS;

/// Packs a payload into square RGBA scanlines
#[derive(Debug, Clone, Copy)]
pub struct PixelPacker<'a> {
    payload: &'a [u8],
    geometry: ImageGeometry,
}

impl<'a> PixelPacker<'a> {
    /// Prepare a payload for packing
    ///
    /// Fails with `PayloadTooLarge` when the length does not fit the 32-bit
    /// header.
    pub fn new(payload: &'a [u8]) -> ConvertResult<Self> {
        let geometry = ImageGeometry::for_len(payload.len())?;
        debug!(
            "packing {} bytes into {}x{} image ({} pixels needed)",
            payload.len(),
            geometry.side,
            geometry.side,
            geometry.pixels_needed
        );
        Ok(PixelPacker { payload, geometry })
    }

    pub fn geometry(&self) -> ImageGeometry {
        self.geometry
    }

    /// Iterate over the image rows, top to bottom
    pub fn scanlines(&self) -> Scanlines<'a> {
        Scanlines {
            payload: self.payload,
            geometry: self.geometry,
            row: 0,
            cursor: None,
        }
    }

    /// Hand every row to `sink` in order, then finalize it
    pub fn pack_into<S: RowSink>(&self, mut sink: S) -> Result<S::Output, S::Error> {
        for scanline in self.scanlines() {
            sink.write_row(&scanline)?;
        }
        sink.finish()
    }
}

/// Row iterator produced by [`PixelPacker::scanlines`]
///
/// Each item is a freshly allocated `side * 4` byte RGBA row.
#[derive(Debug, Clone)]
pub struct Scanlines<'a> {
    payload: &'a [u8],
    geometry: ImageGeometry,
    row: u32,
    // None until the header pixel has been written
    cursor: Option<usize>,
}

impl Scanlines<'_> {
    fn fill(&mut self, scanline: &mut [u8]) {
        let data = match self.cursor {
            Some(_) => scanline,
            None => {
                let (header, rest) = scanline.split_at_mut(CHANNELS);
                header.copy_from_slice(&self.geometry.header());
                self.cursor = Some(0);
                rest
            }
        };

        let cursor = self.cursor.unwrap_or(0);
        let remaining = &self.payload[cursor.min(self.payload.len())..];
        let take = remaining.len().min(data.len());

        data[..take].copy_from_slice(&remaining[..take]);
        data[take..].fill(0);
        self.cursor = Some(cursor + take);
    }
}

impl Iterator for Scanlines<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.geometry.side {
            return None;
        }

        let mut scanline = vec![0u8; self.geometry.row_bytes()];
        self.fill(&mut scanline);
        self.row += 1;
        Some(scanline)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.geometry.side - self.row) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Scanlines<'_> {}
