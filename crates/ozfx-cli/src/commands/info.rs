//! `ozfx info`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ozfx_formats::container::{OzfContainer, ScaleLevel};
use ozfx_reader::OzfMap;
use serde::Serialize;

#[derive(Args)]
pub struct InfoArgs {
    /// Map image file
    #[arg(env = "OZFX_FILE")]
    pub file: PathBuf,

    /// Print JSON instead of text
    #[arg(long, env = "OZFX_JSON")]
    pub json: bool,
}

/// Summary of a map image
#[derive(Debug, Serialize)]
pub struct MapSummary {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<u8>,
    pub width: u32,
    pub height: u32,
    pub file_len: u64,
    pub scales: Vec<ScaleSummary>,
}

/// Summary of one scale level
#[derive(Debug, Serialize)]
pub struct ScaleSummary {
    pub level: usize,
    pub offset: u64,
    pub width: u32,
    pub height: u32,
    pub tile_columns: u16,
    pub tile_rows: u16,
    /// `-1` when tiles are fully ciphered or plain
    pub encryption_depth: i32,
}

impl MapSummary {
    pub fn from_container(container: &OzfContainer) -> Self {
        Self {
            kind: container.kind.to_string(),
            key: container.key(),
            width: container.width(),
            height: container.height(),
            file_len: container.file_len,
            scales: container
                .scales
                .iter()
                .enumerate()
                .map(|(level, scale)| ScaleSummary::new(level, scale))
                .collect(),
        }
    }
}

impl ScaleSummary {
    fn new(level: usize, scale: &ScaleLevel) -> Self {
        Self {
            level,
            offset: scale.offset,
            width: scale.width(),
            height: scale.height(),
            tile_columns: scale.tile_columns(),
            tile_rows: scale.tile_rows(),
            encryption_depth: scale.encoding.depth.as_raw(),
        }
    }
}

pub fn handle(args: &InfoArgs) -> Result<()> {
    let map = OzfMap::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let summary = MapSummary::from_container(map.container());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }
    Ok(())
}

fn print_text(summary: &MapSummary) {
    println!("Kind:   {}", summary.kind);
    if let Some(key) = summary.key {
        println!("Key:    {key:#04x}");
    }
    println!("Size:   {}x{}", summary.width, summary.height);
    println!("Length: {} bytes", summary.file_len);
    println!("Scales: {}", summary.scales.len());
    for scale in &summary.scales {
        println!(
            "  [{}] {}x{} px, {}x{} tiles, offset {}, encryption depth {}",
            scale.level,
            scale.width,
            scale.height,
            scale.tile_columns,
            scale.tile_rows,
            scale.offset,
            scale.encryption_depth
        );
    }
}
