//! Packed pixel buffers, palette expansion and resampling
//!
//! Pixels are `u32` values laid out as `0xAARRGGBB`. Buffers are row-major
//! and top-to-bottom, so a decoded tile (stored bottom-up) is flipped during
//! [`expand_tile`].

mod buffer;
mod error;
mod palette;
mod resample;

pub use buffer::{OPAQUE, PixelBuffer, pack_argb, unpack_rgba};
pub use error::{RasterError, RasterResult};
pub use palette::{expand_indices, expand_tile, palette_color};
pub use resample::{MAX_WEIGHT_SHIFT, ResizePath, Resampler, resize, weight_shift};
