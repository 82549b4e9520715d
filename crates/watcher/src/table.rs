//! Watch table: watch id -> watched directory path
//!
//! Ids handed out by the kernel are small and dense, so the table is a slot
//! vector indexed by id. It grows on demand up to a hard capacity; an id past
//! that capacity is fatal rather than a silent loss of coverage.
//!
//! Paths are kept as raw OS strings. Directory names need not be UTF-8, and
//! the kernel only accepts the exact bytes back.

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};

use crate::error::{Result, WatcherError};
use crate::service::WatchId;

/// Directory separator used in stored paths
pub const SEPARATOR: u8 = b'/';

/// Fixed-capacity mapping from watch id to directory path
///
/// Stored paths always end with exactly one separator.
#[derive(Debug, Clone)]
pub struct WatchTable {
    /// Slot per watch id (None = free)
    slots: Vec<Option<OsString>>,

    /// Hard upper bound on ids
    capacity: usize,

    /// Number of occupied slots
    live: usize,
}

impl WatchTable {
    /// Default capacity (one million directories)
    pub const DEFAULT_CAPACITY: usize = 1_000_000;

    /// Create an empty table accepting ids below `capacity`
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
            live: 0,
        }
    }

    /// Store `path` for `id`, replacing whatever the slot held before.
    ///
    /// Returns the stored (normalized) path.
    pub fn install(&mut self, id: WatchId, path: impl AsRef<OsStr>) -> Result<&OsStr> {
        let index = self.index_for_install(id)?;
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }

        let slot = &mut self.slots[index];
        if slot.is_none() {
            self.live += 1;
        }
        Ok(slot.insert(normalize_dir(path.as_ref())).as_os_str())
    }

    /// Clear the entry for `id`, returning the path it held
    pub fn remove(&mut self, id: WatchId) -> Option<OsString> {
        let index = usize::try_from(id).ok()?;
        let removed = self.slots.get_mut(index)?.take();
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Path watched by `id`.
    ///
    /// A miss is expected right after the watch was retired in the same batch.
    pub fn lookup(&self, id: WatchId) -> Option<&OsStr> {
        let index = usize::try_from(id).ok()?;
        self.slots.get(index)?.as_deref()
    }

    /// Drop every entry (all watches died together, e.g. on unmount)
    pub fn reset_all(&mut self) {
        self.slots.clear();
        self.live = 0;
    }

    /// Replace the `old` prefix with `new` on every stored path under `old`.
    ///
    /// Both prefixes are directory paths; they are normalized before matching.
    /// Returns how many entries were rewritten.
    pub fn rewrite_prefix(&mut self, old: impl AsRef<OsStr>, new: impl AsRef<OsStr>) -> usize {
        let old = normalize_dir(old.as_ref());
        let new = normalize_dir(new.as_ref());
        if old == new {
            return 0;
        }

        let mut rewritten = 0;
        for path in self.slots.iter_mut().flatten() {
            if let Some(rest) = path.as_bytes().strip_prefix(old.as_bytes()) {
                let mut bytes = new.as_bytes().to_vec();
                bytes.extend_from_slice(rest);
                *path = OsString::from_vec(bytes);
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no directory is watched
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Largest id + 1 the table accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over live entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (WatchId, &OsStr)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let path = slot.as_deref()?;
            let id = WatchId::try_from(index).ok()?;
            Some((id, path))
        })
    }

    fn index_for_install(&self, id: WatchId) -> Result<usize> {
        let index = usize::try_from(id).map_err(|_| WatcherError::InvalidWatchId(id))?;
        if index >= self.capacity {
            return Err(WatcherError::CapacityExceeded {
                id,
                capacity: self.capacity,
            });
        }
        Ok(index)
    }
}

impl Default for WatchTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

fn trim_separators(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| *b != SEPARATOR).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Strip trailing separators, keeping a lone `/` for the filesystem root
pub fn trim_dir(path: &OsStr) -> &OsStr {
    let bytes = path.as_bytes();
    let trimmed = trim_separators(bytes);
    if trimmed.is_empty() && bytes.first() == Some(&SEPARATOR) {
        OsStr::new("/")
    } else {
        OsStr::from_bytes(trimmed)
    }
}

/// Canonical stored form of a directory: exactly one trailing separator
pub fn normalize_dir(path: &OsStr) -> OsString {
    let mut bytes = trim_separators(path.as_bytes()).to_vec();
    bytes.push(SEPARATOR);
    OsString::from_vec(bytes)
}

/// Path of `name` inside `dir` (which may or may not end with a separator)
pub fn join_dir(dir: &OsStr, name: &OsStr) -> OsString {
    let mut bytes = dir.as_bytes().to_vec();
    if bytes.last() != Some(&SEPARATOR) {
        bytes.push(SEPARATOR);
    }
    bytes.extend_from_slice(name.as_bytes());
    OsString::from_vec(bytes)
}
