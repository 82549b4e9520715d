//! Notification service contract
//!
//! The watcher never talks to the kernel directly; it arms watches and pulls
//! batches of raw records through [`NotificationService`]. The Linux
//! implementation lives in [`crate::platform`].

use std::ffi::OsString;
use std::io;
use std::path::Path;

use bitflags::bitflags;

/// Small non-negative handle for one watched directory.
///
/// Handed out by the notification service and reused once the watch is retired.
pub type WatchId = i32;

bitflags! {
    /// Change flags carried by a raw record (values match `<sys/inotify.h>`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const ACCESS = 0x0000_0001;
        const MODIFY = 0x0000_0002;
        const ATTRIB = 0x0000_0004;
        const CLOSE_WRITE = 0x0000_0008;
        const CLOSE_NOWRITE = 0x0000_0010;
        const OPEN = 0x0000_0020;
        const MOVED_FROM = 0x0000_0040;
        const MOVED_TO = 0x0000_0080;
        const CREATE = 0x0000_0100;
        const DELETE = 0x0000_0200;
        const DELETE_SELF = 0x0000_0400;
        const MOVE_SELF = 0x0000_0800;
        const UNMOUNT = 0x0000_2000;
        const Q_OVERFLOW = 0x0000_4000;
        const IGNORED = 0x0000_8000;
        const ISDIR = 0x4000_0000;
    }
}

impl EventMask {
    /// Mask armed on every watched directory
    pub const WATCHED: Self = Self::CREATE
        .union(Self::CLOSE_WRITE)
        .union(Self::MOVED_FROM)
        .union(Self::MOVED_TO)
        .union(Self::MOVE_SELF)
        .union(Self::DELETE)
        .union(Self::UNMOUNT)
        .union(Self::Q_OVERFLOW)
        .union(Self::IGNORED);

    /// Bits that take part in classification (everything except `ISDIR`)
    pub const CLASSIFIED: Self = Self::all().difference(Self::ISDIR);
}

/// One change record as delivered by the notification service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Watch the record was reported on (`-1` for queue overflow)
    pub watch_id: WatchId,

    /// Raw flag set
    pub flags: EventMask,

    /// Rename correlation token (only meaningful for moved-from/moved-to)
    pub cookie: u32,

    /// Name of the affected entry, relative to the watched directory (raw bytes)
    pub name: Option<OsString>,
}

impl RawRecord {
    /// Create a record without a name
    pub fn new(watch_id: WatchId, flags: EventMask) -> Self {
        Self {
            watch_id,
            flags,
            cookie: 0,
            name: None,
        }
    }

    /// Set the entry name
    pub fn with_name(mut self, name: impl Into<OsString>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the rename cookie
    pub fn with_cookie(mut self, cookie: u32) -> Self {
        self.cookie = cookie;
        self
    }

    /// Whether the affected entry is a directory
    pub fn is_directory(&self) -> bool {
        self.flags.contains(EventMask::ISDIR)
    }
}

/// Source of watches and change records
pub trait NotificationService {
    /// Arm monitoring for `mask` on `path`.
    ///
    /// Arming a directory that is already watched returns its existing id.
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId>;

    /// Block until at least one record is available and return the batch
    fn read_batch(&mut self) -> io::Result<Vec<RawRecord>>;
}
