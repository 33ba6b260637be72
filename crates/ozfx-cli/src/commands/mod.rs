//! Subcommand handlers

pub mod info;
pub mod tile;
