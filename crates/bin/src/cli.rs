//! CLI argument definitions for the Waypost binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Waypost map object store tools
#[derive(Parser, Debug)]
#[command(name = "waypost")]
#[command(about = "Waypost: inspect map object state, crash reports and map data")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub dirs: DirArgs,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show directories, counters and resource state
    Info,
    /// Allocate new map object UIDs
    Uid(UidArgs),
    /// Check for, show or acknowledge the last crash report
    Crash(CrashArgs),
    /// List downloaded maps from the map index
    Index,
}

/// Directory layout shared by all commands
#[derive(clap::Args, Debug)]
pub struct DirArgs {
    /// Directory for durable data (settings, map databases)
    #[arg(short = 'D', long, default_value = ".", env = "WAYPOST_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Directory for disposable data (crash reports)
    #[arg(short = 'C', long, env = "WAYPOST_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory containing bundled assets
    #[arg(short = 'A', long, env = "WAYPOST_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,
}

/// Arguments for the uid command
#[derive(clap::Args, Debug)]
pub struct UidArgs {
    /// Number of UIDs to allocate
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: u32,
}

/// Arguments for the crash command
#[derive(clap::Args, Debug)]
pub struct CrashArgs {
    /// Print the report contents
    #[arg(long)]
    pub show: bool,

    /// Mark the current report as seen without reporting it
    #[arg(long)]
    pub ack: bool,
}
