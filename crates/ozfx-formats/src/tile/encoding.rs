//! How the bytes of a scale level are obscured on disk

use ozfx_crypto::XorCipher;

use super::error::{TileError, TileResult};

/// Whether a stream's records are ciphered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingVariant {
    /// Records are stored in the clear (OZF2)
    Plain,
    /// Records are XOR-ciphered with a per-file key (OZFX3)
    Encrypted,
}

/// Number of leading bytes of a compressed tile that are ciphered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EncryptionDepth {
    /// The whole compressed tile is ciphered
    #[default]
    Full,
    /// Only the given number of leading bytes are ciphered
    Prefix(usize),
}

impl EncryptionDepth {
    /// Convert the stored integer form, where `-1` means the whole blob
    pub fn from_raw(raw: i32) -> TileResult<Self> {
        match raw {
            -1 => Ok(Self::Full),
            n if n >= 0 => Ok(Self::Prefix(n as usize)),
            n => Err(TileError::InvalidEncryptionDepth(n)),
        }
    }

    /// Integer form of the depth accepted by [`from_raw`](Self::from_raw),
    /// `-1` for [`EncryptionDepth::Full`]. Prefixes beyond `i32::MAX`
    /// saturate.
    pub fn as_raw(self) -> i32 {
        match self {
            Self::Full => -1,
            Self::Prefix(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }

    /// Number of bytes to cipher in a blob of `len` bytes
    pub fn ciphered_len(self, len: usize) -> usize {
        match self {
            Self::Full => len,
            Self::Prefix(n) => n.min(len),
        }
    }
}

/// Everything needed to turn the raw bytes of a scale level back into
/// plain records: variant, stream key and tile encryption depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileEncoding {
    /// Plain or encrypted
    pub variant: EncodingVariant,
    /// Stream key, ignored for plain streams
    pub key: u8,
    /// Ciphered prefix of each compressed tile, ignored for plain streams
    pub depth: EncryptionDepth,
}

impl TileEncoding {
    /// Encoding of a plain stream
    pub const fn plain() -> Self {
        Self {
            variant: EncodingVariant::Plain,
            key: 0,
            depth: EncryptionDepth::Full,
        }
    }

    /// Encoding of an encrypted stream
    pub const fn encrypted(key: u8, depth: EncryptionDepth) -> Self {
        Self {
            variant: EncodingVariant::Encrypted,
            key,
            depth,
        }
    }

    /// Build an encoding from the host-facing parameters
    pub fn from_raw(variant: EncodingVariant, key: u8, encryption_depth: i32) -> TileResult<Self> {
        Ok(Self {
            variant,
            key,
            depth: EncryptionDepth::from_raw(encryption_depth)?,
        })
    }

    /// Whether records must be deciphered
    pub fn is_encrypted(&self) -> bool {
        self.variant == EncodingVariant::Encrypted
    }

    /// Cipher for this encoding, `None` for plain streams
    pub fn cipher(&self) -> Option<XorCipher> {
        self.is_encrypted().then(|| XorCipher::new(self.key))
    }

    /// Decipher the leading bytes of a compressed tile in place
    pub fn decipher_tile(&self, blob: &mut [u8]) {
        if let Some(cipher) = self.cipher() {
            let depth = self.depth.ciphered_len(blob.len());
            cipher.apply_keystream_prefix(blob, depth);
        }
    }
}

impl Default for TileEncoding {
    fn default() -> Self {
        Self::plain()
    }
}
