//! Shared read access to a parsed map image

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use ozfx_formats::container::{OzfContainer, ScaleLevel, StreamKind};
use ozfx_formats::raster::PixelBuffer;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{OzfError, OzfResult};
use crate::stream::OzfStream;

/// A map image with its container parsed up front.
///
/// Tile reads go through one stream guarded by a mutex, so an `OzfMap` can
/// be shared between threads behind an `Arc`.
///
/// ```rust,no_run
/// use ozfx_reader::OzfMap;
///
/// let map = OzfMap::open("world.ozf3")?;
/// let tile = map.tile(0, 3, 2, 64, 64)?;
/// assert_eq!(tile.width(), 64);
/// # Ok::<(), ozfx_reader::OzfError>(())
/// ```
#[derive(Debug)]
pub struct OzfMap<R = File> {
    path: Option<PathBuf>,
    container: OzfContainer,
    stream: Mutex<Option<OzfStream<R>>>,
}

impl OzfMap {
    /// Open and parse a map image file
    pub fn open(path: impl AsRef<Path>) -> OzfResult<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let container = OzfContainer::read(&mut file)?;
        info!(
            "Opened {} map {}: {}x{}, {} scale levels",
            container.kind,
            path.display(),
            container.width(),
            container.height(),
            container.scales.len()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            container,
            stream: Mutex::new(Some(OzfStream::from_reader(file))),
        })
    }
}

impl<R: Read + Seek> OzfMap<R> {
    /// Parse a map image from an open reader
    pub fn from_reader(mut reader: R) -> OzfResult<Self> {
        let container = OzfContainer::read(&mut reader)?;
        debug!(
            "Parsed {} map with {} scale levels",
            container.kind,
            container.scales.len()
        );
        Ok(Self {
            path: None,
            container,
            stream: Mutex::new(Some(OzfStream::from_reader(reader))),
        })
    }

    /// Decode the tile at `(column, row)` of a scale level at `width x height`
    pub fn tile(
        &self,
        scale: usize,
        column: usize,
        row: usize,
        width: usize,
        height: usize,
    ) -> OzfResult<PixelBuffer> {
        let level = self.scale(scale)?;
        let index = level
            .tile_index(column, row)
            .ok_or(OzfError::TileOutOfRange {
                column,
                row,
                columns: usize::from(level.tile_columns()),
                rows: usize::from(level.tile_rows()),
            })?;

        let mut guard = self.stream.lock();
        let stream = guard.as_mut().ok_or(OzfError::Closed)?;
        stream
            .get_tile_with_palette(
                &level.encoding,
                level.palette(),
                level.offset,
                index,
                width,
                height,
            )
            .inspect_err(|e| {
                warn!("Tile ({}, {}) of scale {} failed: {}", column, row, scale, e);
            })
    }
}

impl<R> OzfMap<R> {
    /// Parsed container
    pub fn container(&self) -> &OzfContainer {
        &self.container
    }

    /// Stream kind of the file
    pub fn kind(&self) -> StreamKind {
        self.container.kind
    }

    /// Scale levels in file order
    pub fn scales(&self) -> &[ScaleLevel] {
        &self.container.scales
    }

    /// Scale level by number
    pub fn scale(&self, scale: usize) -> OzfResult<&ScaleLevel> {
        self.container
            .scale(scale)
            .ok_or(OzfError::ScaleOutOfRange {
                scale,
                count: self.container.scales.len(),
            })
    }

    /// Path the map was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.stream.lock().is_none()
    }

    /// Release the backing stream. Later tile reads fail with
    /// [`OzfError::Closed`].
    pub fn close(&self) {
        if let Some(stream) = self.stream.lock().take() {
            stream.close();
            info!("Closed map");
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use ozfx_formats::container::{OzfBuilder, ScaleSpec};
    use ozfx_formats::tile::{EncryptionDepth, Palette, TILE_PIXELS};
    use std::io::Cursor;

    fn two_by_two() -> Vec<u8> {
        let mut palette = Palette::default();
        for i in 0..4u8 {
            palette.set_rgb(i, i * 50, 0, 0);
        }
        let tiles = (0..4u8).map(|i| vec![i; TILE_PIXELS]).collect();
        OzfBuilder::ozfx3(0x5C, EncryptionDepth::Prefix(16))
            .scale(ScaleSpec::new(128, 128, 2, 2, palette, tiles))
            .build()
            .unwrap()
    }

    #[test]
    fn test_tile_by_position() {
        let map = OzfMap::from_reader(Cursor::new(two_by_two())).unwrap();
        assert_eq!(map.kind(), StreamKind::Ozfx3);

        let tile = map.tile(0, 1, 1, 64, 64).unwrap();
        assert!(tile.pixels().iter().all(|&p| p == 0xFF96_0000));
    }

    #[test]
    fn test_out_of_range() {
        let map = OzfMap::from_reader(Cursor::new(two_by_two())).unwrap();
        assert!(matches!(
            map.tile(1, 0, 0, 64, 64),
            Err(OzfError::ScaleOutOfRange { scale: 1, count: 1 })
        ));
        assert!(matches!(
            map.tile(0, 2, 0, 64, 64),
            Err(OzfError::TileOutOfRange {
                column: 2,
                columns: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_closed_map() {
        let map = OzfMap::from_reader(Cursor::new(two_by_two())).unwrap();
        map.close();
        assert!(map.is_closed());
        assert!(matches!(map.tile(0, 0, 0, 64, 64), Err(OzfError::Closed)));
        // Metadata stays available
        assert_eq!(map.scales().len(), 1);
    }
}
