//! Error types for cryptographic operations

use thiserror::Error;

/// Errors that can occur while deriving or applying OZFX3 keys
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key block shorter than the format requires
    #[error("Invalid key block size: expected {expected}, got {actual}")]
    InvalidKeyBlockSize {
        /// Expected key block size in bytes
        expected: usize,
        /// Actual key block size in bytes
        actual: usize,
    },

    /// Key block selector that marks a file the cipher cannot open
    #[error("Unsupported key block selector: 0x{0:02x}")]
    UnsupportedKeyBlock(u8),
}
