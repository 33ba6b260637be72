//! Container parsing error types

use ozfx_crypto::CryptoError;
use thiserror::Error;

use crate::tile::TileError;

/// Container-specific error type
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Stream read or seek failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// First two bytes are not a known magic
    #[error("unknown magic: {0:#06x}")]
    UnknownMagic(u16),

    /// OZFX3 key derivation failed
    #[error("key derivation failed: {0}")]
    Crypto(#[from] CryptoError),

    /// OZFX3 file header deciphered to nonsense, usually a wrong key
    #[error("undecodable header: {0}")]
    UndecodableHeader(String),

    /// Scale table pointer outside the file
    #[error("scale table offset {offset} outside file of {file_len} bytes")]
    InvalidScaleTable {
        /// Deciphered scale table offset
        offset: u64,
        /// File length
        file_len: u64,
    },

    /// Scale table without entries
    #[error("file contains no scale levels")]
    NoScales,

    /// File too short to hold the fixed headers
    #[error("file of {0} bytes is too short")]
    Truncated(u64),

    /// Tile-level failure while parsing or building
    #[error("tile error: {0}")]
    Tile(#[from] TileError),

    /// Invalid builder input
    #[error("invalid build input: {0}")]
    InvalidInput(String),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;
