//! Pixel buffer error types

use thiserror::Error;

/// Raster-specific error type
#[derive(Debug, Error)]
pub enum RasterError {
    /// Width or height of zero
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: usize,
        /// Requested height
        height: usize,
    },

    /// Pixel data that does not match the stated dimensions
    #[error("buffer holds {actual} pixels, {width}x{height} needs {expected}")]
    BufferSizeMismatch {
        /// Stated width
        width: usize,
        /// Stated height
        height: usize,
        /// Pixel count implied by the dimensions
        expected: usize,
        /// Pixel count actually supplied
        actual: usize,
    },
}

/// Result type for raster operations
pub type RasterResult<T> = Result<T, RasterError>;
