//! Resampler benchmarks for each resize path.
//!
//! Run with:
//! ```bash
//! cargo bench --bench resample
//! ```

#![allow(clippy::expect_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ozfx_formats::raster::{PixelBuffer, Resampler};
use std::hint::black_box;

/// 64x64 tile with a smooth gradient in every channel
fn gradient_tile() -> PixelBuffer {
    let pixels = (0..64u32)
        .flat_map(|y| (0..64u32).map(move |x| 0xFF00_0000 | ((x * 4) << 16) | ((y * 4) << 8) | (x + y)))
        .collect();
    PixelBuffer::from_pixels(64, 64, pixels).expect("Failed to build benchmark tile")
}

fn bench_resize_paths(c: &mut Criterion) {
    let tile = gradient_tile();
    let mut resampler = Resampler::new();
    let mut group = c.benchmark_group("resize");

    for (name, width, height) in [
        ("half", 32, 32),
        ("bilinear", 96, 96),
        ("box_down", 45, 45),
        ("box_mixed", 100, 40),
    ] {
        group.bench_function(BenchmarkId::new(name, format!("{width}x{height}")), |b| {
            b.iter(|| {
                resampler
                    .resize(black_box(&tile), width, height)
                    .expect("Resize failed")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resize_paths);
criterion_main!(benches);
