//! Tile access for OZF2/OZFX3 map image files
//!
//! Two entry points sit on top of [`ozfx_formats`]:
//!
//! - [`open_stream`] / [`OzfStream::get_tile`] / [`close_stream`]: a thin
//!   handle where the caller supplies the encoding variant, key, encryption
//!   depth and scale offset on every call
//! - [`OzfMap`]: parses the container once and serves tiles by scale level
//!   and grid position, safe to share between threads
//!
//! ```rust,no_run
//! use ozfx_reader::{EncodingVariant, close_stream, open_stream};
//!
//! let mut stream = open_stream("world.ozf2")?;
//! let tile = stream.get_tile(EncodingVariant::Plain, 0, -1, 54, 0, 128, 128)?;
//! assert_eq!((tile.width(), tile.height()), (128, 128));
//! close_stream(stream);
//! # Ok::<(), ozfx_reader::OzfError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod map;
pub mod stream;

pub use error::{OzfError, OzfResult};
pub use map::OzfMap;
pub use stream::{OzfStream, close_stream, open_stream};

pub use ozfx_formats::{EncodingVariant, PixelBuffer, StreamKind};
