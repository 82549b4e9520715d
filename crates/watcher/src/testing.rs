//! Test doubles shared by the unit tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::exclude::ExclusionFilter;
use crate::service::{EventMask, NotificationService, RawRecord, WatchId};

/// In-memory notification service.
///
/// Hands out ids like the kernel does: the same directory keeps its id, a new
/// one gets the next free number. Batches are scripted up front.
#[derive(Debug, Default)]
pub(crate) struct FakeService {
    ids: HashMap<PathBuf, WatchId>,
    next_id: WatchId,
    refused: HashSet<PathBuf>,
    requests: Vec<String>,
    batches: VecDeque<Vec<RawRecord>>,
}

impl FakeService {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Make `add_watch` fail for `path`
    pub(crate) fn refuse(&mut self, path: impl Into<PathBuf>) {
        self.refused.insert(path.into());
    }

    /// Queue a batch for `read_batch`
    pub(crate) fn push_batch(&mut self, batch: Vec<RawRecord>) {
        self.batches.push_back(batch);
    }

    /// Paths passed to `add_watch`, in call order
    pub(crate) fn requests(&self) -> &[String] {
        &self.requests
    }

    /// Id previously handed out for `path`
    pub(crate) fn id_of(&self, path: impl AsRef<Path>) -> Option<WatchId> {
        self.ids.get(path.as_ref()).copied()
    }
}

impl NotificationService for FakeService {
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId> {
        assert_eq!(mask, EventMask::WATCHED);
        self.requests.push(path.to_string_lossy().into_owned());

        if self.refused.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "refused"));
        }

        if let Some(id) = self.ids.get(path) {
            return Ok(*id);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(path.to_path_buf(), id);
        Ok(id)
    }

    fn read_batch(&mut self) -> io::Result<Vec<RawRecord>> {
        self.batches
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted batch"))
    }
}

/// Create every directory in `dirs` (relative to `root`)
pub(crate) fn make_tree(root: &Path, dirs: &[&str]) {
    for dir in dirs {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
}

/// Count directories under `root` (inclusive) whose names pass `filter`
pub(crate) fn count_dirs(root: &Path, filter: &dyn ExclusionFilter) -> usize {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filter.should_exclude(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .count()
}
