//! Packed 32-bit pixel buffers

use super::error::{RasterError, RasterResult};

/// Fully opaque alpha in packed position
pub const OPAQUE: u32 = 0xFF00_0000;

/// Pack channels into `0xAARRGGBB`
#[inline]
pub const fn pack_argb(red: u8, green: u8, blue: u8, alpha: u8) -> u32 {
    ((alpha as u32) << 24) | ((red as u32) << 16) | ((green as u32) << 8) | blue as u32
}

/// Split a packed `0xAARRGGBB` pixel into `[red, green, blue, alpha]`
#[inline]
pub const fn unpack_rgba(pixel: u32) -> [u8; 4] {
    [
        (pixel >> 16) as u8,
        (pixel >> 8) as u8,
        pixel as u8,
        (pixel >> 24) as u8,
    ]
}

/// Row-major, top-to-bottom image of packed `0xAARRGGBB` pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Buffer of the given size filled with transparent black
    pub fn new(width: usize, height: usize) -> RasterResult<Self> {
        Self::filled(width, height, 0)
    }

    /// Buffer of the given size filled with one pixel value
    pub fn filled(width: usize, height: usize, pixel: u32) -> RasterResult<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        })
    }

    /// Wrap existing pixels, which must match the dimensions exactly
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> RasterResult<Self> {
        check_dimensions(width, height)?;
        let expected = width * height;
        if pixels.len() != expected {
            return Err(RasterError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.height
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Mutable access to all pixels
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Pixel at `(x, y)`, `None` outside the buffer
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> Option<&[u32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.pixels.get(start..start + self.width)
    }

    /// Take ownership of the pixels
    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// Pixels as `R, G, B, A` bytes, row-major
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| unpack_rgba(p)).collect()
    }
}

fn check_dimensions(width: usize, height: usize) -> RasterResult<()> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    Ok(())
}
