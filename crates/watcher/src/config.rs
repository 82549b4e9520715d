//! Watcher configuration
//!
//! One explicit value carries everything the components need: capacity,
//! exclusion patterns, emission flags and the rename-correlation limits.
//! It can be loaded from a TOML file; the CLI merges its flags on top.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WatcherError};
use crate::exclude::SubstringExcludes;
use crate::output::EmitPolicy;
use crate::table::WatchTable;

/// Watcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Watch table capacity (default: 1,000,000)
    #[serde(default = "default_max_watches")]
    pub max_watches: usize,

    /// Directory name substrings to skip (at most 16 are used)
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Also emit housekeeping events (IGNORED, DELETE_SELF, MOVE_SELF, move halves)
    #[serde(default)]
    pub debug: bool,

    /// Suppress per-watch installation announcements
    #[serde(default)]
    pub quiet: bool,

    /// Report elapsed time for tree walks
    #[serde(default)]
    pub stats: bool,

    /// How long an unmatched moved-from waits for its moved-to (0 = forever)
    #[serde(default = "default_move_ttl_ms")]
    pub move_ttl_ms: u64,

    /// Upper bound on simultaneously pending moved-from records
    #[serde(default = "default_max_pending_moves")]
    pub max_pending_moves: usize,

    /// Pause before exiting on a fatal error, so the message can be seen
    #[serde(default = "default_exit_delay_secs")]
    pub exit_delay_secs: u64,
}

impl WatchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|source| WatcherError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Exclusion filter built from `excludes`
    pub fn exclusion_filter(&self) -> SubstringExcludes {
        SubstringExcludes::new(self.excludes.iter().cloned())
    }

    /// Emission flags for the dispatcher
    pub fn emit_policy(&self) -> EmitPolicy {
        EmitPolicy {
            debug: self.debug,
            quiet: self.quiet,
            stats: self.stats,
        }
    }

    /// Time-to-live of a pending moved-from (None = never expires)
    pub fn move_ttl(&self) -> Option<Duration> {
        (self.move_ttl_ms > 0).then(|| Duration::from_millis(self.move_ttl_ms))
    }

    /// Delay before exiting on a fatal error
    pub fn exit_delay(&self) -> Duration {
        Duration::from_secs(self.exit_delay_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_watches: default_max_watches(),
            excludes: Vec::new(),
            debug: false,
            quiet: false,
            stats: false,
            move_ttl_ms: default_move_ttl_ms(),
            max_pending_moves: default_max_pending_moves(),
            exit_delay_secs: default_exit_delay_secs(),
        }
    }
}

fn default_max_watches() -> usize {
    WatchTable::DEFAULT_CAPACITY
}

fn default_move_ttl_ms() -> u64 {
    5_000
}

fn default_max_pending_moves() -> usize {
    1024
}

fn default_exit_delay_secs() -> u64 {
    5
}
