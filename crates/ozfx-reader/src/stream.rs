//! Stream handles over a single map image file
//!
//! An [`OzfStream`] is the host-facing handle: the caller supplies the
//! encoding parameters and scale offset on every call, the stream performs
//! the positioned reads. Reads move the shared file position, so
//! [`OzfStream::get_tile`] takes `&mut self`; sharing one stream between
//! threads needs external locking such as [`crate::OzfMap`] provides.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use ozfx_formats::raster::{PixelBuffer, Resampler, expand_tile};
use ozfx_formats::tile::{
    self, EncodingVariant, ImageHeader, Palette, TILE_HEIGHT, TILE_WIDTH, TileEncoding,
};
use tracing::debug;

use crate::error::OzfResult;

/// Open handle on a map image
#[derive(Debug)]
pub struct OzfStream<R = File> {
    reader: R,
    path: Option<PathBuf>,
    resampler: Resampler,
}

/// Open a map image file for tile reads
pub fn open_stream(path: impl AsRef<Path>) -> OzfResult<OzfStream> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!("Opened stream {}", path.display());
    Ok(OzfStream {
        reader: file,
        path: Some(path.to_path_buf()),
        resampler: Resampler::new(),
    })
}

/// Close a stream, releasing its file handle
pub fn close_stream<R>(stream: OzfStream<R>) {
    stream.close();
}

impl<R> OzfStream<R> {
    /// Wrap an already open reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            path: None,
            resampler: Resampler::new(),
        }
    }

    /// Path the stream was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Take back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Close the stream
    pub fn close(self) {
        match &self.path {
            Some(path) => debug!("Closed stream {}", path.display()),
            None => debug!("Closed stream"),
        }
    }
}

impl<R: Read + Seek> OzfStream<R> {
    /// Read the image header of the scale level at `scale_offset`
    pub fn read_header(
        &mut self,
        variant: EncodingVariant,
        key: u8,
        scale_offset: u64,
    ) -> OzfResult<ImageHeader> {
        self.reader.seek(SeekFrom::Start(scale_offset))?;
        let encoding = TileEncoding {
            variant,
            key,
            ..TileEncoding::plain()
        };
        let header = match encoding.cipher() {
            Some(cipher) => ImageHeader::read_encrypted(&mut self.reader, &cipher)?,
            None => ImageHeader::read_plain(&mut self.reader)?,
        };
        Ok(header)
    }

    /// Decode a tile and return it at `width x height`.
    ///
    /// The palette is read from the image header at `scale_offset`.
    /// `encryption_depth` is `-1` for fully ciphered tiles, otherwise the
    /// number of ciphered leading bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn get_tile(
        &mut self,
        variant: EncodingVariant,
        key: u8,
        encryption_depth: i32,
        scale_offset: u64,
        tile_index: usize,
        width: usize,
        height: usize,
    ) -> OzfResult<PixelBuffer> {
        let encoding = TileEncoding::from_raw(variant, key, encryption_depth)?;
        let header = self.read_header(variant, key, scale_offset)?;
        self.get_tile_with_palette(
            &encoding,
            &header.palette,
            scale_offset,
            tile_index,
            width,
            height,
        )
    }

    /// Decode a tile with an already known palette
    pub fn get_tile_with_palette(
        &mut self,
        encoding: &TileEncoding,
        palette: &Palette,
        scale_offset: u64,
        tile_index: usize,
        width: usize,
        height: usize,
    ) -> OzfResult<PixelBuffer> {
        let decoded = tile::get_tile(&mut self.reader, encoding, scale_offset, tile_index)?;
        let pixels = expand_tile(&decoded, palette)?;

        if width == TILE_WIDTH && height == TILE_HEIGHT {
            return Ok(pixels);
        }
        Ok(self.resampler.resize(&pixels, width, height)?)
    }
}
