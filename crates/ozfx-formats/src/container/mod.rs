//! OZF2/OZFX3 file container
//!
//! A map image file holds one or more scale levels of the same picture. The
//! last four bytes of the file point at a scale table, one 4-byte entry per
//! level, each entry giving the offset of that level's [`ImageHeader`].
//!
//! # Layout
//!
//! - **OZF2** (`0x7778`): a 54-byte [`Ozf2Header`], everything in the clear
//! - **OZFX3** (`0x7780`): an info block whose length is stored at byte 14,
//!   an initial key byte at `0xA2`, a ciphered key block and a ciphered
//!   [`Ozfx3Header`]; every later record is ciphered with the derived key
//!
//! # Example
//!
//! ```rust
//! use ozfx_formats::container::{OzfBuilder, OzfContainer, ScaleSpec, StreamKind};
//! use ozfx_formats::tile::{Palette, TILE_PIXELS};
//! use std::io::Cursor;
//!
//! let scale = ScaleSpec::new(64, 64, 1, 1, Palette::default(), vec![vec![0u8; TILE_PIXELS]]);
//! let bytes = OzfBuilder::ozf2().scale(scale).build().unwrap();
//!
//! let container = OzfContainer::read(&mut Cursor::new(bytes)).unwrap();
//! assert_eq!(container.kind, StreamKind::Ozf2);
//! assert_eq!(container.scales.len(), 1);
//! ```

mod builder;
mod depth;
mod error;
mod header;

pub use builder::{OzfBuilder, ScaleSpec};
pub use depth::{MIN_PROBE_DEPTH, probe_encryption_depth};
pub use error::{ContainerError, ContainerResult};
pub use header::{
    OZF2_HEADER_SIZE, OZF2_MAGIC, OZFX3_HEADER_SIZE, OZFX3_MAGIC, Ozf2Header, Ozfx3Header,
    Ozfx3KeyInfo, StreamKind, key_block_offset, ozfx3_header_offset, read_magic, read_ozfx3_key,
};

use binrw::BinRead;
use binrw::io::{Read, Seek, SeekFrom};
use ozfx_crypto::XorCipher;
use tracing::{debug, warn};

use crate::tile::{
    EncryptionDepth, ImageHeader, Palette, TileEncoding, locate_tile, read_compressed_tile,
};

/// Size of the trailing scale table pointer
const SCALE_POINTER_SIZE: u64 = 4;

/// File header of either stream kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileHeader {
    /// Plain file header
    Ozf2(Ozf2Header),
    /// Encrypted file header with its key material
    Ozfx3 {
        /// Deciphered header
        header: Ozfx3Header,
        /// Key material the header was deciphered with
        key: Ozfx3KeyInfo,
    },
}

impl FileHeader {
    /// Full image width in pixels
    pub fn width(&self) -> u32 {
        match self {
            Self::Ozf2(h) => h.width,
            Self::Ozfx3 { header, .. } => header.width,
        }
    }

    /// Full image height in pixels
    pub fn height(&self) -> u32 {
        match self {
            Self::Ozf2(h) => h.height,
            Self::Ozfx3 { header, .. } => header.height,
        }
    }
}

/// One scale level of a map image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleLevel {
    /// Offset of the level's image header
    pub offset: u64,
    /// Deciphered image header
    pub header: ImageHeader,
    /// Encoding of the level's tiles
    pub encoding: TileEncoding,
}

impl ScaleLevel {
    /// Width of the level in pixels
    pub fn width(&self) -> u32 {
        self.header.width
    }

    /// Height of the level in pixels
    pub fn height(&self) -> u32 {
        self.header.height
    }

    /// Number of tile columns
    pub fn tile_columns(&self) -> u16 {
        self.header.tile_columns
    }

    /// Number of tile rows
    pub fn tile_rows(&self) -> u16 {
        self.header.tile_rows
    }

    /// Colour table of the level
    pub fn palette(&self) -> &Palette {
        &self.header.palette
    }

    /// Index of the tile at a grid position, `None` outside the grid
    pub fn tile_index(&self, column: usize, row: usize) -> Option<usize> {
        let columns = usize::from(self.header.tile_columns);
        let rows = usize::from(self.header.tile_rows);
        (column < columns && row < rows).then(|| row * columns + column)
    }
}

/// Parsed container of a map image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OzfContainer {
    /// Stream kind from the magic
    pub kind: StreamKind,
    /// File header
    pub header: FileHeader,
    /// Scale levels in file order
    pub scales: Vec<ScaleLevel>,
    /// Total file length
    pub file_len: u64,
}

impl OzfContainer {
    /// Parse the container of a map image
    pub fn read<R: Read + Seek>(reader: &mut R) -> ContainerResult<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        if file_len < SCALE_POINTER_SIZE + 2 {
            return Err(ContainerError::Truncated(file_len));
        }

        let kind = StreamKind::from_magic(read_magic(reader)?)?;
        debug!("Detected {} stream of {} bytes", kind, file_len);

        let (header, cipher) = match kind {
            StreamKind::Ozf2 => {
                reader.seek(SeekFrom::Start(0))?;
                let header = Ozf2Header::read(reader)?;
                debug!(
                    "OZF2 header: {}x{}, depth {}, bpp {}",
                    header.width, header.height, header.depth, header.bpp
                );
                (FileHeader::Ozf2(header), None)
            }
            StreamKind::Ozfx3 => {
                let key = read_ozfx3_key(reader)?;
                debug!(
                    "OZFX3 key block: infoblock {} bytes, initial {:#04x}, stream key {:#04x}",
                    key.bytes_per_infoblock, key.initial, key.key
                );
                let cipher = XorCipher::new(key.key);

                reader.seek(SeekFrom::Start(ozfx3_header_offset(key.bytes_per_infoblock)))?;
                let mut raw = [0u8; OZFX3_HEADER_SIZE];
                reader.read_exact(&mut raw)?;
                let header = Ozfx3Header::from_ciphered(&raw, &cipher)?;
                header.validate()?;
                debug!(
                    "OZFX3 header: {}x{}, depth {}, bpp {}",
                    header.width, header.height, header.depth, header.bpp
                );
                (FileHeader::Ozfx3 { header, key }, Some(cipher))
            }
        };

        let offsets = read_scale_table(reader, file_len, cipher.as_ref())?;
        debug!("Scale table holds {} levels", offsets.len());

        let mut scales = Vec::with_capacity(offsets.len());
        for (level, offset) in offsets.into_iter().enumerate() {
            let scale = read_scale_level(reader, offset, cipher.as_ref())?;
            debug!(
                "Scale {} at {}: {}x{} in {}x{} tiles, encryption depth {}",
                level,
                offset,
                scale.width(),
                scale.height(),
                scale.tile_columns(),
                scale.tile_rows(),
                scale.encoding.depth.as_raw()
            );
            scales.push(scale);
        }

        Ok(Self {
            kind,
            header,
            scales,
            file_len,
        })
    }

    /// Stream key, `None` for plain files
    pub fn key(&self) -> Option<u8> {
        match &self.header {
            FileHeader::Ozf2(_) => None,
            FileHeader::Ozfx3 { key, .. } => Some(key.key),
        }
    }

    /// Full image width in pixels
    pub fn width(&self) -> u32 {
        self.header.width()
    }

    /// Full image height in pixels
    pub fn height(&self) -> u32 {
        self.header.height()
    }

    /// Scale level by number
    pub fn scale(&self, level: usize) -> Option<&ScaleLevel> {
        self.scales.get(level)
    }
}

fn read_u32_field<R: Read>(reader: &mut R, cipher: Option<&XorCipher>) -> ContainerResult<u32> {
    let mut raw = [0u8; 4];
    reader.read_exact(&mut raw)?;
    Ok(match cipher {
        Some(cipher) => cipher.decrypt_u32(raw),
        None => u32::from_le_bytes(raw),
    })
}

fn read_scale_table<R: Read + Seek>(
    reader: &mut R,
    file_len: u64,
    cipher: Option<&XorCipher>,
) -> ContainerResult<Vec<u64>> {
    reader.seek(SeekFrom::Start(file_len - SCALE_POINTER_SIZE))?;
    let table_offset = u64::from(read_u32_field(reader, cipher)?);
    if table_offset + SCALE_POINTER_SIZE > file_len {
        return Err(ContainerError::InvalidScaleTable {
            offset: table_offset,
            file_len,
        });
    }

    let count = (file_len - table_offset - SCALE_POINTER_SIZE) / 4;
    if count == 0 {
        return Err(ContainerError::NoScales);
    }

    reader.seek(SeekFrom::Start(table_offset))?;
    (0..count)
        .map(|_| read_u32_field(reader, cipher).map(u64::from))
        .collect()
}

fn read_scale_level<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    cipher: Option<&XorCipher>,
) -> ContainerResult<ScaleLevel> {
    reader.seek(SeekFrom::Start(offset))?;
    let Some(cipher) = cipher else {
        return Ok(ScaleLevel {
            offset,
            header: ImageHeader::read_plain(reader)?,
            encoding: TileEncoding::plain(),
        });
    };

    let header = ImageHeader::read_encrypted(reader, cipher)?;
    let depth = if header.tile_count() == 0 {
        EncryptionDepth::Full
    } else {
        detect_depth(reader, cipher.key(), offset)
    };

    Ok(ScaleLevel {
        offset,
        header,
        encoding: TileEncoding::encrypted(cipher.key(), depth),
    })
}

/// Probe the encryption depth from the first tile of a level.
///
/// An unreadable first tile leaves the depth at full; the tile itself will
/// fail again when requested.
fn detect_depth<R: Read + Seek>(reader: &mut R, key: u8, offset: u64) -> EncryptionDepth {
    let encoding = TileEncoding::encrypted(key, EncryptionDepth::Full);
    let blob = locate_tile(reader, &encoding, offset, 0)
        .and_then(|extent| read_compressed_tile(reader, extent, 0));
    match blob {
        Ok(blob) => probe_encryption_depth(&blob, key),
        Err(e) => {
            warn!("Cannot probe encryption depth of scale at {}: {}", offset, e);
            EncryptionDepth::Full
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tile::TILE_PIXELS;
    use std::io::Cursor;

    fn one_tile_scale() -> ScaleSpec {
        let mut palette = Palette::default();
        palette.set_rgb(1, 10, 20, 30);
        // Varied indices keep the compressed tile longer than the ciphered prefix
        let tile = (0..TILE_PIXELS).map(|i| (i % 251) as u8).collect();
        ScaleSpec::new(64, 64, 1, 1, palette, vec![tile])
    }

    #[test]
    fn test_read_ozf2() {
        let bytes = OzfBuilder::ozf2()
            .image_size(64, 64)
            .scale(one_tile_scale())
            .build()
            .unwrap();
        let container = OzfContainer::read(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(container.kind, StreamKind::Ozf2);
        assert_eq!(container.key(), None);
        assert_eq!((container.width(), container.height()), (64, 64));
        let scale = container.scale(0).unwrap();
        assert_eq!(scale.encoding, TileEncoding::plain());
        assert_eq!(scale.palette().entry(1), 0x000A_141E);
        assert_eq!(scale.tile_index(0, 0), Some(0));
        assert_eq!(scale.tile_index(1, 0), None);
    }

    #[test]
    fn test_read_ozfx3() {
        let bytes = OzfBuilder::ozfx3(0xC3, EncryptionDepth::Prefix(16))
            .image_size(64, 64)
            .scale(one_tile_scale())
            .build()
            .unwrap();
        let container = OzfContainer::read(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(container.kind, StreamKind::Ozfx3);
        assert_eq!(container.key(), Some(0xC3));
        let scale = container.scale(0).unwrap();
        assert_eq!(
            scale.encoding,
            TileEncoding::encrypted(0xC3, EncryptionDepth::Prefix(16))
        );
        assert_eq!(scale.palette().entry(1), 0x000A_141E);
    }

    #[test]
    fn test_unknown_magic() {
        let bytes = vec![0x12, 0x34, 0, 0, 0, 0, 0, 0];
        assert!(matches!(
            OzfContainer::read(&mut Cursor::new(bytes)),
            Err(ContainerError::UnknownMagic(0x3412))
        ));
    }

    #[test]
    fn test_truncated_file() {
        assert!(matches!(
            OzfContainer::read(&mut Cursor::new(vec![0x78, 0x77])),
            Err(ContainerError::Truncated(2))
        ));
    }

    #[test]
    fn test_scale_table_outside_file() {
        let mut bytes = OzfBuilder::ozf2().scale(one_tile_scale()).build().unwrap();
        let len = bytes.len();
        bytes[len - 4..].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            OzfContainer::read(&mut Cursor::new(bytes)),
            Err(ContainerError::InvalidScaleTable { .. })
        ));
    }

    #[test]
    fn test_empty_scale_table() {
        let mut bytes = OzfBuilder::ozf2().scale(one_tile_scale()).build().unwrap();
        let len = bytes.len();
        let pointer = (len - 4) as u32;
        bytes[len - 4..].copy_from_slice(&pointer.to_le_bytes());
        assert!(matches!(
            OzfContainer::read(&mut Cursor::new(bytes)),
            Err(ContainerError::NoScales)
        ));
    }
}
