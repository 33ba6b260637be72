//! `ozfx tile`

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ozfx_formats::tile::{TILE_HEIGHT, TILE_WIDTH};
use ozfx_reader::OzfMap;
use tracing::info;

use crate::pam::write_pam;

#[derive(Args)]
pub struct TileArgs {
    /// Map image file
    #[arg(env = "OZFX_FILE")]
    pub file: PathBuf,

    /// Scale level, 0 is the full-size image
    #[arg(short, long, default_value_t = 0, env = "OZFX_SCALE")]
    pub scale: usize,

    /// Tile column
    #[arg(short, long, env = "OZFX_COLUMN")]
    pub column: usize,

    /// Tile row
    #[arg(short, long, env = "OZFX_ROW")]
    pub row: usize,

    /// Output width in pixels
    #[arg(long, default_value_t = TILE_WIDTH, env = "OZFX_TILE_WIDTH")]
    pub width: usize,

    /// Output height in pixels
    #[arg(long, default_value_t = TILE_HEIGHT, env = "OZFX_TILE_HEIGHT")]
    pub height: usize,

    /// PAM file to write
    #[arg(short, long, env = "OZFX_OUTPUT")]
    pub output: PathBuf,
}

pub fn handle(args: &TileArgs) -> Result<()> {
    let map = OzfMap::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let pixels = map
        .tile(args.scale, args.column, args.row, args.width, args.height)
        .with_context(|| {
            format!(
                "failed to decode tile ({}, {}) of scale {}",
                args.column, args.row, args.scale
            )
        })?;
    map.close();

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    write_pam(&mut BufWriter::new(file), &pixels)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        "Wrote {}x{} tile to {}",
        pixels.width(),
        pixels.height(),
        args.output.display()
    );
    Ok(())
}
