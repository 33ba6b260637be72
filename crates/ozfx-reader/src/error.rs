//! Error types for map image access

use ozfx_formats::{ContainerError, RasterError, TileError};
use thiserror::Error;

/// Errors returned by stream and map operations
#[derive(Debug, Error)]
pub enum OzfError {
    /// Opening or reading the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tile could not be located, read or decompressed
    #[error("tile error: {0}")]
    Tile(#[from] TileError),

    /// Pixel expansion or resampling failed
    #[error("raster error: {0}")]
    Raster(#[from] RasterError),

    /// File container could not be parsed
    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    /// Scale level outside the file
    #[error("scale {scale} out of range (file has {count})")]
    ScaleOutOfRange {
        /// Requested scale level
        scale: usize,
        /// Number of scale levels in the file
        count: usize,
    },

    /// Tile position outside the scale's grid
    #[error("tile ({column}, {row}) out of range for {columns}x{rows} grid")]
    TileOutOfRange {
        /// Requested column
        column: usize,
        /// Requested row
        row: usize,
        /// Columns in the grid
        columns: usize,
        /// Rows in the grid
        rows: usize,
    },

    /// Operation on a stream that was already closed
    #[error("stream is closed")]
    Closed,
}

/// Result type for map image operations
pub type OzfResult<T> = Result<T, OzfError>;
