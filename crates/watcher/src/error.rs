//! Error types for the watcher

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::service::WatchId;

/// Result type for watcher operations
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors raised by the watcher.
///
/// Every variant ends the process: the CLI prints the message with an
/// `error: ` prefix, waits briefly and exits with status 1.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// The notification service could not be created
    #[error("Can not initialize inotify")]
    Init(#[source] io::Error),

    /// The kernel handed out an id beyond the watch table capacity
    #[error("No more empty slots in watch table (capacity: {capacity}). Exiting")]
    CapacityExceeded { id: WatchId, capacity: usize },

    /// The notification service returned an id that can never be valid
    #[error("Invalid watch id {0}")]
    InvalidWatchId(WatchId),

    /// Reading a batch of records failed
    #[error("Fatal error while reading events")]
    Read(#[source] io::Error),

    /// The configuration file could not be parsed
    #[error("Invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Writing output or reading the config file failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
