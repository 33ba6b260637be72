//! Palette index to packed colour expansion

use super::buffer::{OPAQUE, PixelBuffer};
use super::error::{RasterError, RasterResult};
use crate::tile::{DecodedTile, Palette, TILE_HEIGHT, TILE_WIDTH};

/// Opaque packed pixel for a palette entry
#[inline]
pub fn palette_color(palette: &Palette, index: u8) -> u32 {
    OPAQUE | (palette.entry(index) & 0x00FF_FFFF)
}

/// Expand a bottom-up index image into a top-down pixel buffer.
///
/// Alpha is always opaque; the stored fourth palette byte is ignored.
pub fn expand_indices(
    indices: &[u8],
    width: usize,
    height: usize,
    palette: &Palette,
) -> RasterResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    let expected = width * height;
    if indices.len() != expected {
        return Err(RasterError::BufferSizeMismatch {
            width,
            height,
            expected,
            actual: indices.len(),
        });
    }

    let mut pixels = Vec::with_capacity(expected);
    for row in indices.chunks_exact(width).rev() {
        pixels.extend(row.iter().map(|&index| palette_color(palette, index)));
    }
    PixelBuffer::from_pixels(width, height, pixels)
}

/// Expand a decoded tile at its native size
pub fn expand_tile(tile: &DecodedTile, palette: &Palette) -> RasterResult<PixelBuffer> {
    expand_indices(tile.indices(), TILE_WIDTH, TILE_HEIGHT, palette)
}
