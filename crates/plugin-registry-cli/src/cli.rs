//! Argument definitions for `plugreg`.

use std::path::PathBuf;

use clap::Parser;

/// Loads plugin libraries into a registry and lists their creators.
#[derive(Parser, Debug)]
#[command(name = "plugreg", version)]
pub(crate) struct Cli {
    /// Emits the listing as JSON instead of aligned text.
    #[arg(long)]
    pub(crate) json: bool,
    /// Includes each creator's creation fields in the listing.
    #[arg(long)]
    pub(crate) fields: bool,
    /// Exits successfully even if some libraries fail to load.
    #[arg(long)]
    pub(crate) keep_going: bool,
    /// Plugin libraries to load after the configured plugin directory.
    #[arg(value_name = "LIBRARY")]
    pub(crate) libraries: Vec<PathBuf>,
}
