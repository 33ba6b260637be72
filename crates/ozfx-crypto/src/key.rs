//! Stream key derivation for OZFX3 files.
//!
//! An OZFX3 file does not store its stream key directly. It stores an
//! `initial` byte and a 4-byte key block ciphered with that byte. The first
//! deciphered byte of the key block selects an adjustment that is added to
//! `initial` to produce the key used for every other record in the file.

use crate::error::CryptoError;
use crate::xor::XorCipher;

/// Size of the ciphered key block in bytes
pub const KEY_BLOCK_SIZE: usize = 4;

/// Selector value that marks an unsupported file
const REJECTED_SELECTOR: u8 = 0x76;

/// Adjustment added to the initial byte for a deciphered key block selector.
///
/// Unknown selectors add nothing. The rejected selector is an error.
pub fn key_adjustment(selector: u8) -> Result<u8, CryptoError> {
    let adjustment = match selector {
        0xF1 => 0x8A,
        0x18 | 0x54 => 0xA0,
        0x56 => 0xB9,
        0x43 => 0x6A,
        0x83 => 0xA4,
        0xC5 => 0x7E,
        0x38 => 0xC1,
        REJECTED_SELECTOR => return Err(CryptoError::UnsupportedKeyBlock(selector)),
        _ => 0,
    };
    Ok(adjustment)
}

/// Derive the stream key from the initial byte and the raw key block.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyBlockSize` if fewer than
/// [`KEY_BLOCK_SIZE`] bytes are supplied and
/// `CryptoError::UnsupportedKeyBlock` for the rejected selector.
///
/// # Examples
///
/// ```rust
/// use ozfx_crypto::key::{derive_stream_key, encode_key_block};
///
/// let block = encode_key_block(0x10, 0xF1);
/// assert_eq!(derive_stream_key(0x10, &block).unwrap(), 0x9A);
/// ```
pub fn derive_stream_key(initial: u8, key_block: &[u8]) -> Result<u8, CryptoError> {
    let mut block: [u8; KEY_BLOCK_SIZE] = key_block
        .get(..KEY_BLOCK_SIZE)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(CryptoError::InvalidKeyBlockSize {
            expected: KEY_BLOCK_SIZE,
            actual: key_block.len(),
        })?;

    XorCipher::new(initial).apply_keystream(&mut block);

    Ok(initial.wrapping_add(key_adjustment(block[0])?))
}

/// Build a ciphered key block whose first deciphered byte is `selector`.
///
/// The remaining three bytes are zero before ciphering.
pub fn encode_key_block(initial: u8, selector: u8) -> [u8; KEY_BLOCK_SIZE] {
    let mut block = [selector, 0, 0, 0];
    XorCipher::new(initial).apply_keystream(&mut block);
    block
}
