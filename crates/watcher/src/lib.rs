//! Recursive directory tree watching for treewatch
//!
//! This crate provides:
//! - A fixed-capacity watch table (watch id -> directory path)
//! - Recursive watch installation with exclusion rules
//! - Rename correlation (moved-from/moved-to pairs into a single MOVE)
//! - Record classification and the read-classify-react dispatch loop
//! - A Linux inotify notification service
//!
//! Every event is written as one line of the `KIND[,ISDIR]:dir:from:to:` protocol.

pub mod classify;
pub mod config;
pub mod correlate;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod exclude;
pub mod output;
pub mod platform;
pub mod service;
pub mod table;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use config::WatchConfig;
pub use correlate::{MoveCorrelator, MoveResolution};
pub use dispatch::EventDispatcher;
pub use error::{Result, WatcherError};
pub use event::{ChangeEvent, EventKind};
pub use exclude::{ExclusionFilter, SubstringExcludes, MAX_EXCLUDES};
pub use output::{EmitPolicy, Output};
pub use service::{EventMask, NotificationService, RawRecord, WatchId};
pub use table::WatchTable;
pub use walker::RecursiveWatcher;

#[cfg(target_os = "linux")]
pub use platform::linux::InotifyService;
