#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! End-to-end tests of the tile decode pipeline on synthetic map images
//!
//! Files are produced with the crate's own builder, then decoded through the
//! locator, decompressor, palette expander and resampler.

use ozfx_formats::container::{OzfBuilder, OzfContainer, ScaleSpec};
use ozfx_formats::raster::{Resampler, expand_tile};
use ozfx_formats::tile::{
    EncodingVariant, EncryptionDepth, IMAGE_HEADER_SIZE, Palette, TILE_HEIGHT, TILE_PIXELS,
    TILE_WIDTH, TileEncoding, TileError, get_tile,
};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const BLACK: u32 = 0xFF00_0000;
const WHITE: u32 = 0xFFFF_FFFF;

fn black_white_palette() -> Palette {
    let mut palette = Palette::default();
    palette.set_rgb(0, 0, 0, 0);
    palette.set_rgb(1, 255, 255, 255);
    palette
}

fn checkerboard() -> Vec<u8> {
    (0..TILE_PIXELS)
        .map(|i| ((i % TILE_WIDTH + i / TILE_WIDTH) % 2) as u8)
        .collect()
}

fn two_by_two_grid() -> ScaleSpec {
    ScaleSpec::new(
        128,
        128,
        2,
        2,
        black_white_palette(),
        vec![
            checkerboard(),
            vec![0; TILE_PIXELS],
            vec![1; TILE_PIXELS],
            checkerboard(),
        ],
    )
}

#[test]
fn checkerboard_tile_at_native_size() {
    let bytes = OzfBuilder::ozf2().scale(two_by_two_grid()).build().unwrap();
    let mut stream = Cursor::new(bytes);
    let container = OzfContainer::read(&mut stream).unwrap();
    let scale = &container.scales[0];

    let tile = get_tile(&mut stream, &TileEncoding::plain(), scale.offset, 0).unwrap();
    let pixels = expand_tile(&tile, scale.palette()).unwrap();

    assert_eq!((pixels.width(), pixels.height()), (TILE_WIDTH, TILE_HEIGHT));
    for y in 0..TILE_HEIGHT {
        let stored_row = TILE_HEIGHT - 1 - y;
        for x in 0..TILE_WIDTH {
            let expected = if (x + stored_row) % 2 == 1 { WHITE } else { BLACK };
            assert_eq!(pixels.pixel(x, y), Some(expected), "pixel ({x}, {y})");
        }
    }
    // Stored row 0 starts black, so the last output row does too
    assert_eq!(pixels.pixel(0, TILE_HEIGHT - 1), Some(BLACK));
    assert_eq!(pixels.pixel(0, 0), Some(WHITE));
}

#[test]
fn every_tile_of_grid_decodes() {
    let bytes = OzfBuilder::ozf2().scale(two_by_two_grid()).build().unwrap();
    let mut stream = Cursor::new(bytes);
    let container = OzfContainer::read(&mut stream).unwrap();
    let scale = &container.scales[0];

    let solid_black = get_tile(&mut stream, &scale.encoding, scale.offset, 1).unwrap();
    assert!(solid_black.indices().iter().all(|&i| i == 0));
    let solid_white = get_tile(&mut stream, &scale.encoding, scale.offset, 2).unwrap();
    assert!(solid_white.indices().iter().all(|&i| i == 1));
    let corner = get_tile(&mut stream, &scale.encoding, scale.offset, 3).unwrap();
    assert_eq!(corner.indices(), &checkerboard()[..]);
}

#[test]
fn encrypted_tiles_with_prefix_and_full_depth() {
    for depth in [EncryptionDepth::Prefix(16), EncryptionDepth::Full] {
        let bytes = OzfBuilder::ozfx3(0x5E, depth)
            .scale(two_by_two_grid())
            .build()
            .unwrap();
        let mut stream = Cursor::new(bytes);
        let container = OzfContainer::read(&mut stream).unwrap();
        let scale = &container.scales[0];
        assert_eq!(scale.encoding.variant, EncodingVariant::Encrypted);

        // Host-style call with the raw depth integer
        let encoding =
            TileEncoding::from_raw(EncodingVariant::Encrypted, 0x5E, depth.as_raw()).unwrap();
        let tile = get_tile(&mut stream, &encoding, scale.offset, 3).unwrap();
        assert_eq!(tile.indices(), &checkerboard()[..]);
    }
}

#[test]
fn wrong_key_never_yields_a_tile() {
    let bytes = OzfBuilder::ozfx3(0x5E, EncryptionDepth::Full)
        .scale(two_by_two_grid())
        .build()
        .unwrap();
    let mut stream = Cursor::new(bytes);
    let container = OzfContainer::read(&mut stream).unwrap();
    let offset = container.scales[0].offset;

    let wrong = TileEncoding::encrypted(0x5F, EncryptionDepth::Full);
    assert!(get_tile(&mut stream, &wrong, offset, 0).is_err());
}

#[test]
fn empty_tile_extent_is_invalid() {
    let mut bytes = OzfBuilder::ozf2().scale(two_by_two_grid()).build().unwrap();
    let offset = {
        let container = OzfContainer::read(&mut Cursor::new(&bytes)).unwrap();
        container.scales[0].offset as usize
    };

    // Make tile 1 end where it starts
    let table = offset + IMAGE_HEADER_SIZE;
    let start: [u8; 4] = bytes[table + 4..table + 8].try_into().unwrap();
    bytes[table + 8..table + 12].copy_from_slice(&start);

    let mut stream = Cursor::new(bytes);
    let err = get_tile(&mut stream, &TileEncoding::plain(), offset as u64, 1).unwrap_err();
    assert!(matches!(err, TileError::InvalidTile { index: 1, .. }));

    // Neighbouring tiles are unaffected
    assert!(get_tile(&mut stream, &TileEncoding::plain(), offset as u64, 0).is_ok());
}

#[test]
fn index_past_table_is_an_error() {
    let bytes = OzfBuilder::ozf2().scale(two_by_two_grid()).build().unwrap();
    let mut stream = Cursor::new(bytes);
    let container = OzfContainer::read(&mut stream).unwrap();
    let offset = container.scales[0].offset;

    assert!(get_tile(&mut stream, &TileEncoding::plain(), offset, 4).is_err());
}

#[test]
fn signature_mismatch_is_reported() {
    // Plain stream whose tile bytes are read as if ciphered
    let bytes = OzfBuilder::ozf2().scale(two_by_two_grid()).build().unwrap();
    let mut stream = Cursor::new(bytes);
    let container = OzfContainer::read(&mut stream).unwrap();
    let scale = &container.scales[0];

    let extent = ozfx_formats::tile::locate_tile(&mut stream, &scale.encoding, scale.offset, 0)
        .unwrap();
    let blob = ozfx_formats::tile::read_compressed_tile(&mut stream, extent, 0).unwrap();
    let err = ozfx_formats::tile::decode_compressed(
        blob,
        &TileEncoding::encrypted(0x00, EncryptionDepth::Prefix(2)),
    )
    .unwrap_err();
    assert!(matches!(err, TileError::SignatureMismatch(_)));
}

#[test]
fn decoded_tile_resizes_to_requested_size() {
    let bytes = OzfBuilder::ozf2().scale(two_by_two_grid()).build().unwrap();
    let mut stream = Cursor::new(bytes);
    let container = OzfContainer::read(&mut stream).unwrap();
    let scale = &container.scales[0];
    let mut resampler = Resampler::new();

    let white = get_tile(&mut stream, &scale.encoding, scale.offset, 2).unwrap();
    let pixels = expand_tile(&white, scale.palette()).unwrap();
    for (w, h) in [(32, 32), (128, 128), (50, 70), (1, 1)] {
        let resized = resampler.resize(&pixels, w, h).unwrap();
        assert_eq!((resized.width(), resized.height()), (w, h));
        assert!(resized.pixels().iter().all(|&p| p == WHITE));
    }

    // Half reduction of a checkerboard averages every 2x2 block to grey
    let board = get_tile(&mut stream, &scale.encoding, scale.offset, 0).unwrap();
    let pixels = expand_tile(&board, scale.palette()).unwrap();
    let half = resampler.resize(&pixels, 32, 32).unwrap();
    for &p in half.pixels() {
        assert!(p == 0xFF7F_7F7F || p == 0xFF80_8080, "pixel {p:#010x}");
    }
}
