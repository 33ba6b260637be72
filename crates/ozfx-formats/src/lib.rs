//! Parsers and builders for OZF2/OZFX3 tiled map images
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Signed reinterpretation of header fields
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::cast_precision_loss)] // Resampler weight estimate
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
//! A map image stores one picture at several scale levels. Each level is cut
//! into 64x64 tiles of palette indices, every tile compressed with zlib and,
//! in OZFX3 files, partially obscured with a position-keyed XOR cipher.
//!
//! # Components
//!
//! - **Tile**: image header and palette, offset table lookup, decompression
//!   and the full [`tile::get_tile`] decode pipeline
//! - **Raster**: packed 32-bit [`raster::PixelBuffer`], palette expansion and
//!   the three-path [`raster::Resampler`]
//! - **Container**: file magic, OZF2/OZFX3 file headers, key derivation,
//!   scale table, encryption depth detection and the [`container::OzfBuilder`]
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: every on-disk structure can be read and built
//! - **No partial output**: a failed decode is an error, never a half-filled tile
//! - **Stateless**: all functions take the stream and parameters they need

#![warn(missing_docs)]

pub mod container;
pub mod raster;
pub mod tile;

pub use container::{
    ContainerError, ContainerResult, OzfBuilder, OzfContainer, ScaleLevel, ScaleSpec, StreamKind,
};
pub use raster::{PixelBuffer, RasterError, RasterResult, Resampler, resize};
pub use tile::{
    DecodedTile, EncodingVariant, EncryptionDepth, ImageHeader, Palette, TILE_HEIGHT, TILE_WIDTH,
    TileEncoding, TileError, TileResult, get_tile,
};
