//! `ozfx` command-line tool
//!
//! Inspects OZF2/OZFX3 map images and extracts single tiles as PAM images.

mod commands;
mod pam;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::info::InfoArgs;
use commands::tile::TileArgs;

#[derive(Parser)]
#[command(
    name = "ozfx",
    about = "Inspect OZF2/OZFX3 map images and extract tiles",
    version,
    long_about = "Reads OziExplorer OZF2 and OZFX3 map images: lists scale levels and tile grids, and decodes single tiles to RGBA PAM files."
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true, env = "OZFX_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stream kind, key and scale levels of a map image
    Info(InfoArgs),

    /// Decode one tile and write it as a PAM image
    Tile(TileArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info(args) => commands::info::handle(&args),
        Commands::Tile(args) => commands::tile::handle(&args),
    }
}
