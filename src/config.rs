//! Configuration for the watcher daemon.
//!
//! Handles:
//! - Command-line argument parsing
//! - Workspace and settings-file paths

use std::path::PathBuf;

use clap::Parser;

use crate::profile::Engine;
use crate::settings::SettingsStore;

/// Command-line arguments for the addlatex watcher.
#[derive(Debug, Parser)]
#[command(name = "addlatex")]
#[command(about = "Save-watching LaTeX build assistant")]
#[command(version)]
pub struct Args {
    /// Workspace root to watch
    #[arg(default_value = ".")]
    pub workspace: PathBuf,

    /// Engine used for documents classified as Japanese
    #[arg(long, value_enum, default_value = "uplatex")]
    pub engine: Engine,

    /// Profile TOML file overriding the built-in preamble table
    #[arg(long, help = "TOML file with [[profiles]] entries")]
    pub profiles: Option<PathBuf>,

    /// Classify and rewrite only, never invoke the TeX toolchain
    #[arg(long)]
    pub no_build: bool,

    /// Run the pipeline once for a single file and exit
    #[arg(long, value_name = "FILE")]
    pub once: Option<PathBuf>,

    /// Log level for the daemon
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Resolved configuration passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root; builds run from here.
    pub workspace: PathBuf,
    /// Path of the JSON settings store.
    pub settings_path: PathBuf,
    /// Engine for documents classified as Japanese.
    pub japanese_engine: Engine,
    /// Optional profile override file.
    pub profile_path: Option<PathBuf>,
    /// Skip the build stage entirely.
    pub no_build: bool,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Create configuration from parsed command-line arguments.
    pub fn from_args(args: &Args) -> Self {
        Config {
            workspace: args.workspace.clone(),
            settings_path: SettingsStore::default_path(&args.workspace),
            japanese_engine: args.engine,
            profile_path: args.profiles.clone(),
            no_build: args.no_build,
            log_level: args.log_level.clone(),
        }
    }
}
