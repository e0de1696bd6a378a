// Square canvas sizing

use serde::Serialize;

use crate::error::{ConvertError, ConvertResult};
use crate::pixel::CHANNELS;

/// Dimensions of the square image that holds a payload
///
/// One pixel carries the length header, every other pixel carries up to
/// four payload bytes. The side is the smallest integer whose square covers
/// the required pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageGeometry {
    /// Payload length as stored in the header
    pub payload_len: u32,
    /// Header pixel plus the pixels that carry payload bytes
    pub pixels_needed: u64,
    /// Width and height of the image
    pub side: u32,
}

impl ImageGeometry {
    /// Compute the geometry for a payload of `len` bytes
    pub fn for_len(len: usize) -> ConvertResult<Self> {
        let payload_len = u32::try_from(len).map_err(|_| ConvertError::PayloadTooLarge(len))?;

        let pixels_needed = u64::from(payload_len).div_ceil(CHANNELS as u64) + 1;
        let side = ceil_sqrt(pixels_needed);

        Ok(ImageGeometry {
            payload_len,
            pixels_needed,
            // pixels_needed <= 2^30 + 1, so the side stays below 2^16
            side: side as u32,
        })
    }

    /// Total number of pixels in the image
    pub fn total_pixels(&self) -> u64 {
        u64::from(self.side) * u64::from(self.side)
    }

    /// Number of channel bytes in one scanline
    pub fn row_bytes(&self) -> usize {
        self.side as usize * CHANNELS
    }

    /// Number of channel bytes in the whole image
    pub fn total_bytes(&self) -> u64 {
        self.total_pixels() * CHANNELS as u64
    }

    /// The four header channels, most significant byte first
    pub fn header(&self) -> [u8; CHANNELS] {
        self.payload_len.to_be_bytes()
    }
}

/// Smallest `s` with `s * s >= n`
fn ceil_sqrt(n: u64) -> u64 {
    let mut s = (n as f64).sqrt() as u64;
    // Float rounding can land one off in either direction
    while s > 0 && (s - 1) * (s - 1) >= n {
        s -= 1;
    }
    while s * s < n {
        s += 1;
    }
    s
}
