//! Cryptographic operations for OZF2/OZFX3 map images
//!
//! OZFX3 files obscure their headers, offset tables and compressed tiles with
//! a position-keyed XOR stream cipher. This crate provides that cipher and the
//! derivation of the per-file stream key.
//!
//! # Components
//!
//! - **Cipher**: [`XorCipher`], a stateless transform keyed by one byte
//! - **Key derivation**: [`derive_stream_key`] from the file's key block
//!
//! # Examples
//!
//! ```
//! use ozfx_crypto::XorCipher;
//!
//! let cipher = XorCipher::new(0x2F);
//! let raw = cipher.encrypt_u32(4096);
//! assert_eq!(cipher.decrypt_u32(raw), 4096);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod xor;

pub use error::CryptoError;

// Re-export commonly used types
pub use key::{KEY_BLOCK_SIZE, derive_stream_key, encode_key_block};
pub use xor::{KEY_CYCLE, KEY_TABLE, XorCipher, decode, decode_prefix};
