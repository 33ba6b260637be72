//! Position-keyed XOR cipher used by OZFX3 map images.
//!
//! Every ciphered record in an OZFX3 file (header fields, palette, offset
//! table entries and the leading bytes of compressed tiles) is obscured with
//! the same transform: the byte at position `j` of the record is XORed with
//! `KEY_TABLE[j % KEY_CYCLE] + key`, where `key` is the per-file stream key.
//!
//! The keystream restarts at position zero for every record, so the cipher is
//! a pure function of `(bytes, key)`. Applying it twice restores the input.
//!
//! ## Usage
//!
//! ```rust
//! use ozfx_crypto::xor::XorCipher;
//!
//! let cipher = XorCipher::new(0x5A);
//!
//! let mut data = b"offset table entry".to_vec();
//! cipher.apply_keystream(&mut data);
//! cipher.apply_keystream(&mut data);
//! assert_eq!(&data, b"offset table entry");
//! ```

/// Key table of the OZFX3 "d1" cipher.
///
/// Only the first [`KEY_CYCLE`] entries take part in the keystream; the two
/// trailing bytes are part of the table as stored by the format.
pub const KEY_TABLE: [u8; 28] = [
    0x2D, 0x4A, 0x43, 0xF1, 0x27, 0x9B, 0x69, 0x4F, 0x36, 0x52, 0x87, 0xEC, 0x5F, 0x42, 0x53, 0x22,
    0x9E, 0x8B, 0x2D, 0x83, 0x3D, 0xD2, 0x84, 0xBA, 0xD8, 0x5B, 0x8B, 0xC0,
];

/// Keystream period of the OZFX3 cipher.
pub const KEY_CYCLE: usize = 0x1A;

/// XOR stream cipher keyed by a single byte.
///
/// The cipher holds no mutable state, so one instance can be shared freely
/// and reused for any number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorCipher {
    key: u8,
    table: &'static [u8],
    cycle: usize,
}

impl XorCipher {
    /// Create a cipher over the OZFX3 key table with the given stream key.
    pub const fn new(key: u8) -> Self {
        Self {
            key,
            table: &KEY_TABLE,
            cycle: KEY_CYCLE,
        }
    }

    /// Create a cipher over a custom key table and period.
    ///
    /// The period is clamped to `1..=table.len()` so that keystream lookups
    /// never leave the table. An empty table yields a keystream that only
    /// consists of `key`.
    pub fn with_table(key: u8, table: &'static [u8], cycle: usize) -> Self {
        Self {
            key,
            table,
            cycle: cycle.clamp(1, table.len().max(1)),
        }
    }

    /// The stream key this cipher was created with.
    pub const fn key(&self) -> u8 {
        self.key
    }

    /// Keystream byte for a position inside a record.
    #[inline]
    pub fn keystream_byte(&self, position: usize) -> u8 {
        let base = self.table.get(position % self.cycle).copied().unwrap_or(0);
        base.wrapping_add(self.key)
    }

    /// Apply the keystream to a whole record in place.
    ///
    /// Encryption and decryption are the same operation.
    pub fn apply_keystream(&self, data: &mut [u8]) {
        for (position, byte) in data.iter_mut().enumerate() {
            *byte ^= self.keystream_byte(position);
        }
    }

    /// Apply the keystream to the first `depth` bytes of a record in place.
    ///
    /// Bytes past `depth` are left untouched. A depth larger than the record
    /// covers the whole record.
    pub fn apply_keystream_prefix(&self, data: &mut [u8], depth: usize) {
        let end = depth.min(data.len());
        self.apply_keystream(&mut data[..end]);
    }

    /// Return a deciphered copy of a record.
    pub fn decrypt(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_keystream(&mut out);
        out
    }

    /// Decipher a 4-byte little-endian field.
    pub fn decrypt_u32(&self, mut raw: [u8; 4]) -> u32 {
        self.apply_keystream(&mut raw);
        u32::from_le_bytes(raw)
    }

    /// Decipher a 2-byte little-endian field.
    pub fn decrypt_u16(&self, mut raw: [u8; 2]) -> u16 {
        self.apply_keystream(&mut raw);
        u16::from_le_bytes(raw)
    }

    /// Encipher a 4-byte little-endian field.
    pub fn encrypt_u32(&self, value: u32) -> [u8; 4] {
        let mut raw = value.to_le_bytes();
        self.apply_keystream(&mut raw);
        raw
    }

    /// Encipher a 2-byte little-endian field.
    pub fn encrypt_u16(&self, value: u16) -> [u8; 2] {
        let mut raw = value.to_le_bytes();
        self.apply_keystream(&mut raw);
        raw
    }
}

/// Decipher a record in place with the OZFX3 key table.
pub fn decode(data: &mut [u8], key: u8) {
    XorCipher::new(key).apply_keystream(data);
}

/// Decipher the first `depth` bytes of a record in place with the OZFX3 key
/// table.
pub fn decode_prefix(data: &mut [u8], key: u8, depth: usize) {
    XorCipher::new(key).apply_keystream_prefix(data, depth);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_keystream() {
        let mut data = [0u8; 4];
        decode(&mut data, 0);
        assert_eq!(data, [0x2D, 0x4A, 0x43, 0xF1]);

        let mut data = [0u8; 4];
        decode(&mut data, 1);
        assert_eq!(data, [0x2E, 0x4B, 0x44, 0xF2]);
    }

    #[test]
    fn test_keystream_wraps_key_addition() {
        let cipher = XorCipher::new(0xFF);
        // 0xF1 + 0xFF wraps to 0xF0
        assert_eq!(cipher.keystream_byte(3), 0xF0);
    }

    #[test]
    fn test_keystream_period_is_key_cycle() {
        let cipher = XorCipher::new(0x37);
        for position in 0..KEY_CYCLE {
            assert_eq!(
                cipher.keystream_byte(position),
                cipher.keystream_byte(position + KEY_CYCLE)
            );
        }
        // Table bytes past the cycle never show up in the keystream
        assert_eq!(cipher.keystream_byte(26), KEY_TABLE[0].wrapping_add(0x37));
    }

    #[test]
    fn test_prefix_leaves_tail_untouched() {
        let original: Vec<u8> = (0..40u8).collect();
        let mut data = original.clone();
        decode_prefix(&mut data, 0x42, 16);

        assert_ne!(&data[..16], &original[..16]);
        assert_eq!(&data[16..], &original[16..]);
    }

    #[test]
    fn test_prefix_longer_than_record() {
        let mut prefixed = vec![7u8; 10];
        let mut whole = prefixed.clone();
        decode_prefix(&mut prefixed, 3, 1000);
        decode(&mut whole, 3);
        assert_eq!(prefixed, whole);
    }

    #[test]
    fn test_field_helpers_round_trip() {
        let cipher = XorCipher::new(0x9C);
        assert_eq!(cipher.decrypt_u32(cipher.encrypt_u32(0x0001_2345)), 0x0001_2345);
        assert_eq!(cipher.decrypt_u16(cipher.encrypt_u16(0xBEEF)), 0xBEEF);
    }

    #[test]
    fn test_custom_table() {
        static TABLE: [u8; 3] = [1, 2, 3];
        let cipher = XorCipher::with_table(0, &TABLE, 2);
        let mut data = [0u8; 4];
        cipher.apply_keystream(&mut data);
        assert_eq!(data, [1, 2, 1, 2]);

        // Cycle larger than the table is clamped to the table length
        let cipher = XorCipher::with_table(0, &TABLE, 99);
        let mut data = [0u8; 4];
        cipher.apply_keystream(&mut data);
        assert_eq!(data, [1, 2, 3, 1]);
    }

    #[test]
    fn test_empty_record() {
        let mut data: [u8; 0] = [];
        decode(&mut data, 0x11);
        assert!(XorCipher::new(0x11).decrypt(&data).is_empty());
    }

    proptest! {
        #[test]
        fn cipher_is_self_inverse(data in prop::collection::vec(any::<u8>(), 0..512), key in any::<u8>()) {
            let mut transformed = data.clone();
            decode(&mut transformed, key);
            decode(&mut transformed, key);
            prop_assert_eq!(transformed, data);
        }

        #[test]
        fn cipher_depends_only_on_relative_position(
            data in prop::collection::vec(any::<u8>(), 1..256),
            shift in 1usize..64,
            key in any::<u8>()
        ) {
            // Ciphering a record embedded at an arbitrary offset inside a larger
            // buffer gives the same bytes as ciphering the record on its own.
            let mut standalone = data.clone();
            decode(&mut standalone, key);

            let mut embedded = vec![0u8; shift];
            embedded.extend_from_slice(&data);
            decode(&mut embedded[shift..], key);

            prop_assert_eq!(&embedded[shift..], &standalone[..]);
        }
    }
}
