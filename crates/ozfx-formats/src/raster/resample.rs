//! High-quality resize of packed 32-bit images.
//!
//! Coordinates are mapped in 24.8 fixed point: source position `x1 = x2 * 256
//! * w1 / w2`, with the low 8 bits as the fractional part. One of three paths
//! is chosen per call from the source and destination shapes:
//!
//! - [`ResizePath::HalfReduce`]: exact 2:1 on both axes, each output pixel is
//!   the average of a 2x2 block, computed on two packed 16-bit lanes with the
//!   rounding remainder carried to the next pixel of the row
//! - [`ResizePath::BilinearUpscale`]: both axes grow, each output pixel blends
//!   its four nearest source pixels
//! - [`ResizePath::WeightedBox`]: everything else, every overlapped source
//!   pixel contributes in proportion to its coverage
//!
//! All four channels, alpha included, are filtered.
//!
//! ```rust
//! use ozfx_formats::raster::{PixelBuffer, resize};
//!
//! let src = PixelBuffer::filled(64, 64, 0xFF20_4060).unwrap();
//! let dst = resize(&src, 100, 30).unwrap();
//! assert_eq!((dst.width(), dst.height()), (100, 30));
//! assert!(dst.pixels().iter().all(|&p| p == 0xFF20_4060));
//! ```

use super::buffer::PixelBuffer;
use super::error::{RasterError, RasterResult};

/// Fixed-point scale of source coordinates
const FIXED_ONE: usize = 256;

/// Largest accepted weight shift
pub const MAX_WEIGHT_SHIFT: u32 = 15;

/// Accumulator budget the weight shift keeps sums within
const ACCUMULATOR_LIMIT: f64 = 4_294_967_000.0;

/// Resize algorithm chosen for a pair of shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizePath {
    /// Exact 2:1 reduction on both axes
    HalfReduce,
    /// Growth on both axes
    BilinearUpscale,
    /// Any other shape change
    WeightedBox,
}

impl ResizePath {
    /// Select the path for resizing `w1 x h1` to `w2 x h2`
    pub const fn select(w1: usize, h1: usize, w2: usize, h2: usize) -> Self {
        if w2 * 2 == w1 && h2 * 2 == h1 {
            Self::HalfReduce
        } else if w1 < w2 && h1 < h2 {
            Self::BilinearUpscale
        } else {
            Self::WeightedBox
        }
    }
}

/// Right shift applied to per-pixel weight products.
///
/// Derived from the worst-case accumulated weight of one output pixel,
/// rounded up to a power of two and capped at [`MAX_WEIGHT_SHIFT`].
pub fn weight_shift(w1: usize, h1: usize, w2: usize, h2: usize) -> u32 {
    if w2 == 0 || h2 == 0 {
        return 0;
    }
    let texels = (w1 as f64 / w2 as f64 + 1.0) * (h1 as f64 / h2 as f64 + 1.0);
    let accumulated = texels * 65536.0 * 256.0;
    let ratio = accumulated / ACCUMULATOR_LIMIT;
    if ratio > 1.0 {
        (ratio.log2().ceil() as u32).min(MAX_WEIGHT_SHIFT)
    } else {
        0
    }
}

/// Fixed-point source coordinate of destination index `i`
#[inline]
fn fixed_coord(i: usize, src_len: usize, dst_len: usize) -> usize {
    (i as u64 * FIXED_ONE as u64 * src_len as u64 / dst_len as u64) as usize
}

/// Start and end of the source span covered by one destination pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn box_span(i: usize, src_len: usize, dst_len: usize) -> Self {
        let start = fixed_coord(i, src_len, dst_len);
        let end = if src_len < dst_len {
            // Several outputs share one source pixel: blend with the next one
            start + FIXED_ONE
        } else {
            fixed_coord(i + 1, src_len, dst_len)
        };
        Self {
            start,
            end: end.min(FIXED_ONE * src_len - 1),
        }
    }

    fn bilinear(i: usize, src_len: usize, dst_len: usize) -> Self {
        let start = fixed_coord(i, src_len, dst_len).min(FIXED_ONE * (src_len - 1));
        Self { start, end: start }
    }

    const fn first(self) -> usize {
        self.start >> 8
    }

    const fn last(self) -> usize {
        self.end >> 8
    }

    /// Coverage weight of source pixel `p`, in 1/256 units
    fn weight(self, p: usize) -> u64 {
        if self.first() == self.last() {
            FIXED_ONE as u64
        } else if p == self.first() {
            (FIXED_ONE - (self.start & 0xFF)) as u64
        } else if p == self.last() {
            (self.end & 0xFF) as u64
        } else {
            FIXED_ONE as u64
        }
    }
}

#[inline]
fn channel(pixel: u32, index: usize) -> u64 {
    u64::from((pixel >> (index * 8)) & 0xFF)
}

#[inline]
fn pack_channels(channels: [u64; 4]) -> u32 {
    channels
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, &c)| acc | ((c.min(255) as u32) << (i * 8)))
}

/// Resampler with reusable per-column scratch space.
///
/// Reusing one instance across calls of the same destination width avoids
/// reallocating the column cache.
#[derive(Debug, Clone, Default)]
pub struct Resampler {
    columns: Vec<Span>,
}

impl Resampler {
    /// Create a resampler with empty scratch space
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize `src` to `width x height`
    pub fn resize(
        &mut self,
        src: &PixelBuffer,
        width: usize,
        height: usize,
    ) -> RasterResult<PixelBuffer> {
        let mut dst = PixelBuffer::new(width, height)?;
        self.resize_into(src, &mut dst)?;
        Ok(dst)
    }

    /// Resize `src` into the whole of `dst`, overwriting every pixel
    pub fn resize_into(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> RasterResult<()> {
        let (w1, h1) = (src.width(), src.height());
        let (w2, h2) = (dst.width(), dst.height());
        if w1 == 0 || h1 == 0 {
            return Err(RasterError::InvalidDimensions {
                width: w1,
                height: h1,
            });
        }
        if w2 == 0 || h2 == 0 {
            return Err(RasterError::InvalidDimensions {
                width: w2,
                height: h2,
            });
        }

        match ResizePath::select(w1, h1, w2, h2) {
            ResizePath::HalfReduce => half_reduce(src, dst),
            ResizePath::BilinearUpscale => self.bilinear_upscale(src, dst),
            ResizePath::WeightedBox => self.weighted_box(src, dst),
        }
        Ok(())
    }

    fn bilinear_upscale(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) {
        let (w1, h1) = (src.width(), src.height());
        let (w2, h2) = (dst.width(), dst.height());
        let shift = weight_shift(w1, h1, w2, h2);
        let pixels = src.pixels();

        self.columns.clear();
        self.columns
            .extend((0..w2).map(|x2| Span::bilinear(x2, w1, w2)));

        for (y2, out_row) in dst.pixels_mut().chunks_exact_mut(w2).enumerate() {
            let y1a = Span::bilinear(y2, h1, h2).start;
            let rows = [y1a >> 8, ((y1a >> 8) + 1).min(h1 - 1)];
            let fy = (y1a & 0xFF) as u64;
            let weights_y = [FIXED_ONE as u64 - fy, fy];

            for (out, column) in out_row.iter_mut().zip(&self.columns) {
                let x1a = column.start;
                let cols = [x1a >> 8, ((x1a >> 8) + 1).min(w1 - 1)];
                let fx = (x1a & 0xFF) as u64;
                let weights_x = [FIXED_ONE as u64 - fx, fx];

                let mut sums = [0u64; 4];
                for (&row, &wy) in rows.iter().zip(&weights_y) {
                    for (&col, &wx) in cols.iter().zip(&weights_x) {
                        let pixel = pixels[row * w1 + col];
                        let w = (wx * wy) >> shift;
                        for (c, sum) in sums.iter_mut().enumerate() {
                            *sum += channel(pixel, c) * w;
                        }
                    }
                }
                *out = pack_channels(sums.map(|s| s >> (16 - shift)));
            }
        }
    }

    fn weighted_box(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) {
        let (w1, h1) = (src.width(), src.height());
        let (w2, h2) = (dst.width(), dst.height());
        let shift = weight_shift(w1, h1, w2, h2);
        let pixels = src.pixels();

        self.columns.clear();
        self.columns
            .extend((0..w2).map(|x2| Span::box_span(x2, w1, w2)));

        for (y2, out_row) in dst.pixels_mut().chunks_exact_mut(w2).enumerate() {
            let span_y = Span::box_span(y2, h1, h2);

            for (out, span_x) in out_row.iter_mut().zip(&self.columns) {
                let mut sums = [0u64; 4];
                let mut total = 0u64;

                for y in span_y.first()..=span_y.last() {
                    let wy = span_y.weight(y);
                    let row = &pixels[y * w1..(y + 1) * w1];
                    for x in span_x.first()..=span_x.last() {
                        let w = (span_x.weight(x) * wy) >> shift;
                        let pixel = row[x];
                        for (c, sum) in sums.iter_mut().enumerate() {
                            *sum += channel(pixel, c) * w;
                        }
                        total += w;
                    }
                }

                let total = total.max(1);
                *out = pack_channels(sums.map(|s| s / total));
            }
        }
    }
}

/// Average 2x2 blocks on two packed lanes: red/blue and alpha/green.
///
/// The two low bits of every lane sum are carried into the next block of
/// the same row, so rounding error does not accumulate along a row.
fn half_reduce(src: &PixelBuffer, dst: &mut PixelBuffer) {
    const LANES: u32 = 0x00FF_00FF;
    const CARRY: u32 = 0x0003_0003;

    let w1 = src.width();
    let w2 = dst.width();
    let pixels = src.pixels();

    for (y2, out_row) in dst.pixels_mut().chunks_exact_mut(w2).enumerate() {
        let upper = &pixels[2 * y2 * w1..(2 * y2 + 1) * w1];
        let lower = &pixels[(2 * y2 + 1) * w1..(2 * y2 + 2) * w1];
        let mut carry_rb = 0u32;
        let mut carry_ag = 0u32;

        for (x2, out) in out_row.iter_mut().enumerate() {
            let block = [
                upper[2 * x2],
                upper[2 * x2 + 1],
                lower[2 * x2],
                lower[2 * x2 + 1],
            ];
            let rb = block.iter().map(|&p| p & LANES).sum::<u32>() + carry_rb;
            let ag = block.iter().map(|&p| (p >> 8) & LANES).sum::<u32>() + carry_ag;
            carry_rb = rb & CARRY;
            carry_ag = ag & CARRY;
            *out = ((rb >> 2) & LANES) | (((ag >> 2) & LANES) << 8);
        }
    }
}

/// Resize `src` to `width x height` with call-scoped scratch space
pub fn resize(src: &PixelBuffer, width: usize, height: usize) -> RasterResult<PixelBuffer> {
    Resampler::new().resize(src, width, height)
}
