//! Recursive watch installation
//!
//! The notification service has no recursive watch, so coverage of a subtree
//! is built by walking it and arming every directory. Each level arms all of
//! its children before descending into any of them, which keeps the window
//! between a directory appearing and its watch being armed short.

use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;
use crate::exclude::ExclusionFilter;
use crate::output::Output;
use crate::service::{EventMask, NotificationService, WatchId};
use crate::table::{join_dir, trim_dir, WatchTable};

/// Walks directory trees and arms a watch on every directory found
pub struct RecursiveWatcher<'a, S, W> {
    service: &'a mut S,
    table: &'a mut WatchTable,
    filter: &'a dyn ExclusionFilter,
    output: &'a mut Output<W>,
    quiet: bool,
}

impl<'a, S, W> RecursiveWatcher<'a, S, W>
where
    S: NotificationService,
    W: Write,
{
    pub fn new(
        service: &'a mut S,
        table: &'a mut WatchTable,
        filter: &'a dyn ExclusionFilter,
        output: &'a mut Output<W>,
    ) -> Self {
        Self {
            service,
            table,
            filter,
            output,
            quiet: false,
        }
    }

    /// Suppress `info: Watcher ID ...` announcements
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Watch every directory under `root`.
    ///
    /// `root` itself is armed only when `install_root` is set. Returns the
    /// number of subdirectories found directly under `root`.
    ///
    /// A directory that cannot be armed is reported and skipped; only a
    /// watch table overflow aborts the walk.
    pub fn watch_tree(&mut self, root: impl AsRef<OsStr>, install_root: bool) -> Result<usize> {
        self.walk(root.as_ref(), install_root)
    }

    fn walk(&mut self, root: &OsStr, install_root: bool) -> Result<usize> {
        let root = trim_dir(root);
        if install_root {
            self.add_watch(root)?;
        }

        let children = self.subdirectories(root);

        // Arm every child before descending
        for child in &children {
            self.add_watch(child)?;
        }
        for child in &children {
            self.walk(child, false)?;
        }

        Ok(children.len())
    }

    /// Arm a single directory and record it in the table
    pub fn add_watch(&mut self, dir: impl AsRef<OsStr>) -> Result<Option<WatchId>> {
        let dir = Path::new(dir.as_ref());
        match self.service.add_watch(dir, EventMask::WATCHED) {
            Ok(id) => {
                let stored = Path::new(self.table.install(id, dir)?);
                if !self.quiet {
                    self.output
                        .info(format_args!("Watcher ID {id}, dir {}", stored.display()))?;
                }
                Ok(Some(id))
            }
            Err(e) => {
                debug!("add_watch({}) failed: {}", dir.display(), e);
                self.output.error(format_args!(
                    "Can not establish watch for dir {}",
                    dir.display()
                ))?;
                Ok(None)
            }
        }
    }

    /// Direct child directories of `dir` that pass the exclusion filter
    fn subdirectories(&self, dir: &OsStr) -> Vec<OsString> {
        let mut children = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Can not list {}: {}", Path::new(dir).display(), e);
                    continue;
                }
            };

            // Symlinks are not followed, so only real directories count
            if !entry.file_type().is_dir() {
                continue;
            }

            // Patterns are text; the path keeps the raw name
            let name = entry.file_name();
            if self.filter.should_exclude(&name.to_string_lossy()) {
                debug!("Excluding {}", entry.path().display());
                continue;
            }

            children.push(join_dir(dir, name));
        }

        children
    }
}
