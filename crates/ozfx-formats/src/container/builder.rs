//! Builder for complete OZF2/OZFX3 files

use ozfx_crypto::{XorCipher, encode_key_block};

use super::error::{ContainerError, ContainerResult};
use super::header::{
    OZF2_HEADER_SIZE, OZFX3_INFOBLOCK_LEN_OFFSET, OZFX3_INITIAL_KEY_OFFSET, OZFX3_MAGIC,
    Ozf2Header, Ozfx3Header, StreamKind, key_block_offset, ozfx3_header_offset,
};
use crate::tile::{
    EncryptionDepth, IMAGE_HEADER_SIZE, ImageHeader, OFFSET_ENTRY_SIZE, Palette, TILE_PIXELS,
    TileEncoding, compress_tile,
};
use binrw::BinWrite;
use binrw::io::Cursor;

/// Info block length used for built OZFX3 files
const BUILD_INFOBLOCK_LEN: u8 = 150;

/// Key block selector used for built OZFX3 files
const BUILD_KEY_SELECTOR: u8 = 0xF1;

/// Adjustment [`BUILD_KEY_SELECTOR`] adds to the initial byte
const BUILD_KEY_ADJUSTMENT: u8 = 0x8A;

/// Content of one scale level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSpec {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of tile columns
    pub tile_columns: u16,
    /// Number of tile rows
    pub tile_rows: u16,
    /// Colour table
    pub palette: Palette,
    /// Row-major tiles, each `TILE_PIXELS` indices in stored order
    pub tiles: Vec<Vec<u8>>,
}

impl ScaleSpec {
    /// Describe a scale level
    pub fn new(
        width: u32,
        height: u32,
        tile_columns: u16,
        tile_rows: u16,
        palette: Palette,
        tiles: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            width,
            height,
            tile_columns,
            tile_rows,
            palette,
            tiles,
        }
    }

    fn validate(&self, level: usize) -> ContainerResult<()> {
        let expected = usize::from(self.tile_columns) * usize::from(self.tile_rows);
        if self.tiles.len() != expected {
            return Err(ContainerError::InvalidInput(format!(
                "scale {level}: {} tiles for a {}x{} grid",
                self.tiles.len(),
                self.tile_columns,
                self.tile_rows
            )));
        }
        if let Some(i) = self.tiles.iter().position(|t| t.len() != TILE_PIXELS) {
            return Err(ContainerError::InvalidInput(format!(
                "scale {level}: tile {i} holds {} indices, expected {TILE_PIXELS}",
                self.tiles[i].len()
            )));
        }
        Ok(())
    }

    fn image_header(&self) -> ImageHeader {
        ImageHeader {
            width: self.width,
            height: self.height,
            tile_columns: self.tile_columns,
            tile_rows: self.tile_rows,
            palette: self.palette.clone(),
        }
    }
}

/// Writes complete map image files.
///
/// ```rust
/// use ozfx_formats::container::{OzfBuilder, ScaleSpec};
/// use ozfx_formats::tile::{EncryptionDepth, Palette, TILE_PIXELS};
///
/// let bytes = OzfBuilder::ozfx3(0x42, EncryptionDepth::Prefix(16))
///     .scale(ScaleSpec::new(64, 64, 1, 1, Palette::default(), vec![vec![0; TILE_PIXELS]]))
///     .build()
///     .unwrap();
/// assert_eq!(&bytes[..2], &[0x80, 0x77]);
/// ```
#[derive(Debug, Clone)]
pub struct OzfBuilder {
    kind: StreamKind,
    encoding: TileEncoding,
    image_size: Option<(u32, u32)>,
    scales: Vec<ScaleSpec>,
}

impl OzfBuilder {
    /// Builder for a plain OZF2 file
    pub fn ozf2() -> Self {
        Self {
            kind: StreamKind::Ozf2,
            encoding: TileEncoding::plain(),
            image_size: None,
            scales: Vec::new(),
        }
    }

    /// Builder for an encrypted OZFX3 file with the given stream key
    pub fn ozfx3(key: u8, depth: EncryptionDepth) -> Self {
        Self {
            kind: StreamKind::Ozfx3,
            encoding: TileEncoding::encrypted(key, depth),
            image_size: None,
            scales: Vec::new(),
        }
    }

    /// Full image size written to the file header.
    ///
    /// Defaults to the size of the first scale level.
    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = Some((width, height));
        self
    }

    /// Append a scale level
    pub fn scale(mut self, scale: ScaleSpec) -> Self {
        self.scales.push(scale);
        self
    }

    /// Write the file
    pub fn build(&self) -> ContainerResult<Vec<u8>> {
        let first = self
            .scales
            .first()
            .ok_or_else(|| ContainerError::InvalidInput("no scale levels".to_string()))?;
        for (level, scale) in self.scales.iter().enumerate() {
            scale.validate(level)?;
        }
        let (width, height) = self.image_size.unwrap_or((first.width, first.height));
        let cipher = self.encoding.cipher();

        let mut out = match self.kind {
            StreamKind::Ozf2 => {
                let mut cursor = Cursor::new(Vec::with_capacity(OZF2_HEADER_SIZE));
                Ozf2Header::new(width, height).write(&mut cursor)?;
                cursor.into_inner()
            }
            StreamKind::Ozfx3 => self.ozfx3_preamble(width, height)?,
        };

        let mut scale_offsets = Vec::with_capacity(self.scales.len());
        for scale in &self.scales {
            scale_offsets.push(to_u32(out.len())?);
            self.write_scale(&mut out, scale, cipher.as_ref())?;
        }

        let table_offset = to_u32(out.len())?;
        for offset in scale_offsets {
            out.extend_from_slice(&encode_u32(offset, cipher.as_ref()));
        }
        out.extend_from_slice(&encode_u32(table_offset, cipher.as_ref()));
        Ok(out)
    }

    fn ozfx3_preamble(&self, width: u32, height: u32) -> ContainerResult<Vec<u8>> {
        let key = self.encoding.key;
        let initial = key.wrapping_sub(BUILD_KEY_ADJUSTMENT);
        let key_block_at = key_block_offset(BUILD_INFOBLOCK_LEN) as usize;
        let header_at = ozfx3_header_offset(BUILD_INFOBLOCK_LEN) as usize;

        let mut out = vec![0u8; header_at];
        out[..2].copy_from_slice(&OZFX3_MAGIC.to_le_bytes());
        out[OZFX3_INFOBLOCK_LEN_OFFSET as usize] = BUILD_INFOBLOCK_LEN;
        out[OZFX3_INITIAL_KEY_OFFSET as usize] = initial;
        out[key_block_at..header_at].copy_from_slice(&encode_key_block(initial, BUILD_KEY_SELECTOR));

        let header = Ozfx3Header::new(width, height);
        out.extend_from_slice(&header.to_ciphered(&XorCipher::new(key))?);
        Ok(out)
    }

    fn write_scale(
        &self,
        out: &mut Vec<u8>,
        scale: &ScaleSpec,
        cipher: Option<&XorCipher>,
    ) -> ContainerResult<()> {
        let scale_offset = out.len();
        out.extend_from_slice(&scale.image_header().to_bytes(cipher)?);

        let mut blobs = Vec::with_capacity(scale.tiles.len());
        for tile in &scale.tiles {
            let mut blob = compress_tile(tile)?;
            self.encoding.decipher_tile(&mut blob);
            blobs.push(blob);
        }

        let table_len = (blobs.len() + 1) * OFFSET_ENTRY_SIZE;
        let mut position = scale_offset + IMAGE_HEADER_SIZE + table_len;
        out.extend_from_slice(&encode_u32(to_u32(position)?, cipher));
        for blob in &blobs {
            position += blob.len();
            out.extend_from_slice(&encode_u32(to_u32(position)?, cipher));
        }
        for blob in &blobs {
            out.extend_from_slice(blob);
        }
        Ok(())
    }
}

fn to_u32(position: usize) -> ContainerResult<u32> {
    u32::try_from(position)
        .map_err(|_| ContainerError::InvalidInput(format!("offset {position} exceeds 4 GiB")))
}

fn encode_u32(value: u32, cipher: Option<&XorCipher>) -> [u8; 4] {
    match cipher {
        Some(cipher) => cipher.encrypt_u32(value),
        None => value.to_le_bytes(),
    }
}
