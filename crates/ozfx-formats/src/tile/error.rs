//! Tile decoding error types

use thiserror::Error;

/// Tile-specific error type
#[derive(Debug, Error)]
pub enum TileError {
    /// Stream read or seek failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Offset table entries that do not delimit a stored tile
    #[error("invalid tile {index}: offsets {start}..{end} do not delimit a stored tile")]
    InvalidTile {
        /// Tile index within its scale level
        index: usize,
        /// First offset table entry
        start: u32,
        /// Second offset table entry
        end: u32,
    },

    /// Offset table entry position does not fit in a stream offset
    #[error("offset table entry of tile {index} at scale offset {scale_offset} overflows")]
    PositionOverflow {
        /// Scale offset supplied by the caller
        scale_offset: u64,
        /// Tile index supplied by the caller
        index: usize,
    },

    /// Index buffer that does not hold exactly one tile
    #[error("index buffer holds {actual} indices, expected {expected}")]
    IndexBufferSize {
        /// Indices in one tile
        expected: usize,
        /// Indices supplied
        actual: usize,
    },

    /// Compressed tile larger than any valid tile
    #[error("tile {index} is {len} bytes (maximum {max})")]
    TileTooLarge {
        /// Tile index within its scale level
        index: usize,
        /// Compressed length from the offset table
        len: usize,
        /// Maximum accepted compressed length
        max: usize,
    },

    /// Compressed tile does not start with the zlib signature
    #[error("zlib signature mismatch: expected [78 DA], got {0:02X?}")]
    SignatureMismatch(Vec<u8>),

    /// Inflate failed or produced the wrong amount of data
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Encryption depth outside `-1..`
    #[error("invalid encryption depth: {0}")]
    InvalidEncryptionDepth(i32),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for tile operations
pub type TileResult<T> = Result<T, TileError>;
