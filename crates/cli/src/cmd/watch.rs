//! Watch a directory tree and stream change lines to stdout

use anyhow::{bail, Result};
use std::io::{self, Write};
use tracing::{debug, info};
use watcher::WatchConfig;

use crate::args::Cli;

/// Run the watcher until a fatal error
///
/// Only returns on failure; the caller owns the exit policy.
pub fn run(cli: &Cli, config: &WatchConfig) -> Result<()> {
    let service = open_service()?;

    let Some(root) = cli.root() else {
        bail!("No directory specified");
    };

    let stdout = io::stdout();
    if !cli.extra_dirs().is_empty() {
        let mut out = stdout.lock();
        writeln!(out, "error: Exactly one directory permitted.")?;
        writeln!(out, "Ignoring any subsequent specified directory")?;
        out.flush()?;
    }

    info!(root = %root.display(), max_watches = config.max_watches, "Starting watcher");

    let writer = io::BufWriter::new(stdout);
    let mut dispatcher = watcher::EventDispatcher::new(service, config, writer);
    let installed = dispatcher.watch_root(root)?;
    debug!(installed, "Initial walk complete");

    dispatcher.run()?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn open_service() -> Result<watcher::InotifyService> {
    Ok(watcher::InotifyService::new()?)
}

#[cfg(not(target_os = "linux"))]
fn open_service() -> Result<UnsupportedService> {
    bail!("Can not initialize inotify")
}

#[cfg(not(target_os = "linux"))]
pub enum UnsupportedService {}

#[cfg(not(target_os = "linux"))]
impl watcher::NotificationService for UnsupportedService {
    fn add_watch(&mut self, _path: &std::path::Path, _mask: watcher::EventMask) -> io::Result<watcher::WatchId> {
        match *self {}
    }

    fn read_batch(&mut self) -> io::Result<Vec<watcher::RawRecord>> {
        match *self {}
    }
}
