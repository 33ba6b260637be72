//! Single-shot zlib inflate of compressed tiles

use flate2::read::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Read;

use super::error::{TileError, TileResult};

/// The two bytes every compressed tile starts with
pub const ZLIB_SIGNATURE: [u8; 2] = [0x78, 0xDA];

/// Largest compressed tile accepted by the decoder
pub const MAX_COMPRESSED_TILE_SIZE: usize = 64 * 1024;

/// Verify the zlib signature at the start of a compressed tile
pub fn check_signature(compressed: &[u8]) -> TileResult<()> {
    match compressed.get(..ZLIB_SIGNATURE.len()) {
        Some(head) if head == ZLIB_SIGNATURE => Ok(()),
        Some(head) => Err(TileError::SignatureMismatch(head.to_vec())),
        None => Err(TileError::SignatureMismatch(compressed.to_vec())),
    }
}

/// Inflate a compressed tile to exactly `expected_len` bytes.
///
/// The signature is checked before any decompression is attempted. The
/// stream must end, consume every input byte and produce exactly
/// `expected_len` bytes.
pub fn inflate_tile(compressed: &[u8], expected_len: usize) -> TileResult<Vec<u8>> {
    check_signature(compressed)?;

    // One spare byte so that overlong streams are detected instead of truncated
    let mut out = vec![0u8; expected_len + 1];
    let mut inflater = Decompress::new(true);
    let status = inflater
        .decompress(compressed, &mut out, FlushDecompress::Finish)
        .map_err(|e| TileError::Decompression(format!("zlib inflate failed: {e}")))?;

    let produced = inflater.total_out() as usize;
    let consumed = inflater.total_in() as usize;

    if status != Status::StreamEnd {
        return Err(TileError::Decompression(format!(
            "stream ended early: {produced} of {expected_len} bytes produced"
        )));
    }
    if produced != expected_len {
        return Err(TileError::Decompression(format!(
            "size mismatch: expected {expected_len} bytes, got {produced}"
        )));
    }
    if consumed != compressed.len() {
        return Err(TileError::Decompression(format!(
            "{} trailing bytes after end of stream",
            compressed.len() - consumed
        )));
    }

    out.truncate(expected_len);
    Ok(out)
}

/// Compress tile data into a zlib stream carrying [`ZLIB_SIGNATURE`]
pub fn compress_tile(data: &[u8]) -> TileResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(data, Compression::best());
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| TileError::Decompression(format!("zlib compression failed: {e}")))?;

    // FLEVEL is informational only and 0x78DA passes the header check
    if compressed.len() >= ZLIB_SIGNATURE.len() {
        compressed[..ZLIB_SIGNATURE.len()].copy_from_slice(&ZLIB_SIGNATURE);
    }
    Ok(compressed)
}
