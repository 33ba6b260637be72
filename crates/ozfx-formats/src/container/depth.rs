//! Encryption depth detection for OZFX3 scale levels

use ozfx_crypto::XorCipher;

use crate::tile::{EncryptionDepth, TILE_PIXELS, inflate_tile};

/// Shortest ciphered prefix tried by [`probe_encryption_depth`]
pub const MIN_PROBE_DEPTH: usize = 4;

/// Find how many leading bytes of a compressed tile are ciphered.
///
/// Tries deciphering growing prefixes of a copy of `blob` until one inflates
/// to a complete tile. A prefix covering the whole blob, or no successful
/// prefix at all, yields [`EncryptionDepth::Full`].
pub fn probe_encryption_depth(blob: &[u8], key: u8) -> EncryptionDepth {
    let cipher = XorCipher::new(key);
    let mut scratch = vec![0u8; blob.len()];

    for depth in MIN_PROBE_DEPTH..=blob.len() {
        scratch.copy_from_slice(blob);
        cipher.apply_keystream_prefix(&mut scratch, depth);
        if inflate_tile(&scratch, TILE_PIXELS).is_ok() {
            return if depth == blob.len() {
                EncryptionDepth::Full
            } else {
                EncryptionDepth::Prefix(depth)
            };
        }
    }

    EncryptionDepth::Full
}
