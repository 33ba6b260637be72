//! Tile offset table lookup

use binrw::io::{Read, Seek, SeekFrom};

use super::encoding::TileEncoding;
use super::error::{TileError, TileResult};
use super::header::IMAGE_HEADER_SIZE;

/// Size of one offset table entry in bytes
pub const OFFSET_ENTRY_SIZE: usize = 4;

/// Byte range of one compressed tile within the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileExtent {
    /// Absolute position of the first compressed byte
    pub offset: u64,
    /// Compressed length in bytes, always non-zero
    pub len: usize,
}

impl TileExtent {
    /// Position one past the last compressed byte
    pub fn end(&self) -> u64 {
        self.offset + self.len as u64
    }
}

/// Position of the offset table entry for a tile.
///
/// Positions past `u64::MAX` are [`TileError::PositionOverflow`].
pub fn offset_entry_position(scale_offset: u64, tile_index: usize) -> TileResult<u64> {
    u64::try_from(tile_index)
        .ok()
        .and_then(|index| index.checked_mul(OFFSET_ENTRY_SIZE as u64))
        .and_then(|table| table.checked_add(IMAGE_HEADER_SIZE as u64))
        .and_then(|relative| relative.checked_add(scale_offset))
        .ok_or(TileError::PositionOverflow {
            scale_offset,
            index: tile_index,
        })
}

/// Read the two offset table entries that delimit a tile.
///
/// For encrypted streams each entry is deciphered on its own. A tile whose
/// end does not lie strictly after its start is reported as
/// [`TileError::InvalidTile`].
pub fn locate_tile<R: Read + Seek>(
    reader: &mut R,
    encoding: &TileEncoding,
    scale_offset: u64,
    tile_index: usize,
) -> TileResult<TileExtent> {
    reader.seek(SeekFrom::Start(offset_entry_position(scale_offset, tile_index)?))?;

    let mut raw = [0u8; OFFSET_ENTRY_SIZE * 2];
    reader.read_exact(&mut raw)?;

    let mut start = [raw[0], raw[1], raw[2], raw[3]];
    let mut end = [raw[4], raw[5], raw[6], raw[7]];
    if let Some(cipher) = encoding.cipher() {
        cipher.apply_keystream(&mut start);
        cipher.apply_keystream(&mut end);
    }
    let start = u32::from_le_bytes(start);
    let end = u32::from_le_bytes(end);

    if end <= start {
        return Err(TileError::InvalidTile {
            index: tile_index,
            start,
            end,
        });
    }

    Ok(TileExtent {
        offset: u64::from(start),
        len: (end - start) as usize,
    })
}
