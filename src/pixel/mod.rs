// Pixel packing
//
// Image structure:
// - Square, 8 bits per channel, RGBA
// - Pixel (0, 0): payload length, u32 big-endian across R, G, B, A
// - Following pixels: payload bytes in raster order, four per pixel
// - Remaining channels: zero
//
// A decoder reads the header, then that many bytes in the same order, and
// ignores everything after.

pub mod geometry;
pub mod packer;
pub mod sink;

pub use geometry::ImageGeometry;
pub use packer::{PixelPacker, Scanlines};
pub use sink::{CompressionLevel, PngOptions, PngSink, RowSink};

/// Channels per pixel (RGBA)
pub const CHANNELS: usize = 4;
