//! Image header and palette that precede each scale level's offset table

use binrw::io::{Cursor, Read, Seek};
use binrw::{BinRead, BinWrite};
use ozfx_crypto::XorCipher;

use super::error::TileResult;

/// Number of palette entries
pub const PALETTE_SIZE: usize = 256;

/// Palette size in bytes
pub const PALETTE_BYTES: usize = PALETTE_SIZE * 4;

/// Size of the fixed image header in bytes (width, height, grid, palette)
pub const IMAGE_HEADER_SIZE: usize = 4 + 4 + 2 + 2 + PALETTE_BYTES;

/// 256-entry colour table.
///
/// Entries are stored as little-endian u32 values whose bytes are
/// blue, green, red and a fourth byte that is ignored on expansion,
/// i.e. `0x??RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct Palette(pub [u32; PALETTE_SIZE]);

impl Default for Palette {
    fn default() -> Self {
        Self([0; PALETTE_SIZE])
    }
}

impl Palette {
    /// Build a palette from its packed entries
    pub const fn new(entries: [u32; PALETTE_SIZE]) -> Self {
        Self(entries)
    }

    /// Parse a palette from its 1024 stored bytes
    pub fn from_bytes(bytes: &[u8; PALETTE_BYTES]) -> Self {
        let mut entries = [0u32; PALETTE_SIZE];
        for (entry, chunk) in entries.iter_mut().zip(bytes.chunks_exact(4)) {
            *entry = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(entries)
    }

    /// Serialize the palette to its 1024 stored bytes
    pub fn to_bytes(&self) -> [u8; PALETTE_BYTES] {
        let mut bytes = [0u8; PALETTE_BYTES];
        for (chunk, entry) in bytes.chunks_exact_mut(4).zip(self.0.iter()) {
            chunk.copy_from_slice(&entry.to_le_bytes());
        }
        bytes
    }

    /// Stored entry for a palette index
    #[inline]
    pub fn entry(&self, index: u8) -> u32 {
        self.0[index as usize]
    }

    /// Set the stored entry for a palette index from its colour channels
    pub fn set_rgb(&mut self, index: u8, red: u8, green: u8, blue: u8) {
        self.0[index as usize] = u32::from_le_bytes([blue, green, red, 0]);
    }
}

/// Header of one scale level.
///
/// Sits at the scale offset and is immediately followed by the tile offset
/// table.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ImageHeader {
    /// Width of this scale level in pixels
    pub width: u32,
    /// Height of this scale level in pixels
    pub height: u32,
    /// Number of tile columns
    pub tile_columns: u16,
    /// Number of tile rows
    pub tile_rows: u16,
    /// Colour table shared by all tiles of this scale level
    pub palette: Palette,
}

impl ImageHeader {
    /// Number of tiles in the grid
    pub fn tile_count(&self) -> usize {
        usize::from(self.tile_columns) * usize::from(self.tile_rows)
    }

    /// Read a header stored in the clear
    pub fn read_plain<R: Read + Seek>(reader: &mut R) -> TileResult<Self> {
        Ok(Self::read(reader)?)
    }

    /// Read a header whose fields are ciphered one by one
    pub fn read_encrypted<R: Read + Seek>(reader: &mut R, cipher: &XorCipher) -> TileResult<Self> {
        let mut raw = [0u8; IMAGE_HEADER_SIZE];
        reader.read_exact(&mut raw)?;
        apply_field_cipher(&mut raw, cipher);
        Ok(Self::read(&mut Cursor::new(&raw[..]))?)
    }

    /// Serialize the header, ciphering each field when a cipher is given
    pub fn to_bytes(&self, cipher: Option<&XorCipher>) -> TileResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(IMAGE_HEADER_SIZE));
        self.write(&mut cursor)?;
        let mut bytes = cursor.into_inner();
        if let Some(cipher) = cipher {
            apply_field_cipher(&mut bytes, cipher);
        }
        Ok(bytes)
    }
}

/// Field boundaries of the image header; the keystream restarts at each one.
const FIELD_RANGES: [(usize, usize); 5] = [
    (0, 4),
    (4, 8),
    (8, 10),
    (10, 12),
    (12, IMAGE_HEADER_SIZE),
];

fn apply_field_cipher(bytes: &mut [u8], cipher: &XorCipher) {
    for (start, end) in FIELD_RANGES {
        if let Some(field) = bytes.get_mut(start..end) {
            cipher.apply_keystream(field);
        }
    }
}
