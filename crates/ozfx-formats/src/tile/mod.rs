//! Tile storage of one scale level
//!
//! A scale level starts with an [`ImageHeader`] (dimensions, tile grid and
//! palette), followed by an offset table with one 4-byte entry per tile plus
//! a terminator. Entry `i` and `i + 1` delimit the zlib stream of tile `i`.
//!
//! # Decode pipeline
//!
//! 1. [`locate_tile`] reads the two offset entries, deciphering them for
//!    encrypted streams
//! 2. [`read_compressed_tile`] reads the compressed bytes
//! 3. [`TileEncoding::decipher_tile`] undoes the cipher on the leading
//!    `encryption_depth` bytes
//! 4. [`inflate_tile`] checks the zlib signature and inflates exactly
//!    `TILE_WIDTH * TILE_HEIGHT` palette indices
//!
//! [`get_tile`] runs all four steps.

mod decoder;
mod decompress;
mod encoding;
mod error;
mod header;
mod locator;

pub use decoder::{DecodedTile, decode_compressed, get_tile, read_compressed_tile};
pub use decompress::{
    MAX_COMPRESSED_TILE_SIZE, ZLIB_SIGNATURE, check_signature, compress_tile, inflate_tile,
};
pub use encoding::{EncodingVariant, EncryptionDepth, TileEncoding};
pub use error::{TileError, TileResult};
pub use header::{IMAGE_HEADER_SIZE, ImageHeader, PALETTE_BYTES, PALETTE_SIZE, Palette};
pub use locator::{OFFSET_ENTRY_SIZE, TileExtent, locate_tile, offset_entry_position};

/// Width of a stored tile in pixels
pub const TILE_WIDTH: usize = 64;

/// Height of a stored tile in pixels
pub const TILE_HEIGHT: usize = 64;

/// Number of palette indices in a stored tile
pub const TILE_PIXELS: usize = TILE_WIDTH * TILE_HEIGHT;
