//! Command-line arguments

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use watcher::WatchConfig;

/// treewatch - recursive directory change watcher
///
/// Prints one line per change: KIND[,ISDIR]:directory:from:to:
#[derive(Parser, Debug, Default)]
#[command(name = "treewatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit housekeeping events (IGNORED, DELETE_SELF, MOVE_SELF, MOVED_FROM/TO)
    #[arg(short = 'd')]
    pub debug: bool,

    /// Skip directories whose name contains SUBSTRING (repeatable, up to 16)
    #[arg(short = 'E', value_name = "SUBSTRING")]
    pub exclude: Vec<String>,

    /// Do not announce each installed watch
    #[arg(short = 'q')]
    pub quiet: bool,

    /// Print elapsed time of tree walks
    #[arg(short = 's')]
    pub stats: bool,

    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Watch table capacity
    #[arg(long, value_name = "N")]
    pub max_watches: Option<usize>,

    /// Directory to watch (exactly one)
    #[arg(value_name = "DIR")]
    pub dirs: Vec<PathBuf>,
}

impl Cli {
    /// Configuration file contents (or defaults) with the flags applied on top
    pub fn load_config(&self) -> Result<WatchConfig> {
        let base = match &self.config {
            Some(path) => WatchConfig::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
            None => WatchConfig::default(),
        };
        Ok(self.merge_into(base))
    }

    /// Apply flags over `config`: switches only turn options on, excludes append
    pub fn merge_into(&self, mut config: WatchConfig) -> WatchConfig {
        config.debug |= self.debug;
        config.quiet |= self.quiet;
        config.stats |= self.stats;
        config.excludes.extend(self.exclude.iter().cloned());
        if let Some(max_watches) = self.max_watches {
            config.max_watches = max_watches;
        }
        config
    }

    /// Directory to watch, if one was given
    pub fn root(&self) -> Option<&Path> {
        self.dirs.first().map(PathBuf::as_path)
    }

    /// Directories given beyond the first
    pub fn extra_dirs(&self) -> &[PathBuf] {
        self.dirs.get(1..).unwrap_or_default()
    }
}
