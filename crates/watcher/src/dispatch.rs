//! Event dispatch loop
//!
//! Reads batches from the notification service and handles each record to
//! completion before the next: classify, resolve its path, apply the side
//! effect (table cleanup, subtree re-watch, full reset), emit. Re-watching
//! runs inline, so a burst of nested directory creations is handled
//! correctly but without a time bound per batch.

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::classify::{classify, locate, needs_directory, visibility, Located, Visibility};
use crate::config::WatchConfig;
use crate::correlate::{MoveCorrelator, MoveResolution};
use crate::error::{Result, WatcherError};
use crate::event::{ChangeEvent, EventKind};
use crate::exclude::ExclusionFilter;
use crate::output::{EmitPolicy, Output};
use crate::service::{NotificationService, RawRecord};
use crate::table::WatchTable;
use crate::walker::RecursiveWatcher;

/// Owns the watch state and drives the read-classify-react cycle
pub struct EventDispatcher<S, W> {
    service: S,
    table: WatchTable,
    correlator: MoveCorrelator,
    filter: Box<dyn ExclusionFilter>,
    output: Output<W>,
    policy: EmitPolicy,
}

impl<S, W> EventDispatcher<S, W>
where
    S: NotificationService,
    W: Write,
{
    /// Create a dispatcher writing to `writer`
    pub fn new(service: S, config: &WatchConfig, writer: W) -> Self {
        Self {
            service,
            table: WatchTable::new(config.max_watches),
            correlator: MoveCorrelator::new(config.move_ttl(), config.max_pending_moves),
            filter: Box::new(config.exclusion_filter()),
            output: Output::new(writer),
            policy: config.emit_policy(),
        }
    }

    /// Replace the exclusion filter
    pub fn with_filter(mut self, filter: impl ExclusionFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Initial walk: watch `root` and everything below it
    pub fn watch_root(&mut self, root: impl AsRef<OsStr>) -> Result<usize> {
        let root = root.as_ref();
        let started = Instant::now();
        let found = self.walker().watch_tree(root, true)?;
        info!(
            "Watching {} director(ies) under {}",
            self.table.len(),
            Path::new(root).display()
        );

        if self.policy.stats {
            self.output.elapsed("establishing watches", started)?;
        }
        self.output.flush()?;
        Ok(found)
    }

    /// Process batches forever; returns only on a fatal error
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.run_once()?;
        }
    }

    /// Read and process one batch, returning the number of records handled
    pub fn run_once(&mut self) -> Result<usize> {
        let batch = self.service.read_batch().map_err(WatcherError::Read)?;
        self.process_batch(&batch)?;
        Ok(batch.len())
    }

    /// Handle every record of a batch, then flush the output
    pub fn process_batch(&mut self, records: &[RawRecord]) -> Result<()> {
        for record in records {
            self.handle_record(record)?;
        }
        self.output.flush()?;
        Ok(())
    }

    /// Handle a single record
    pub fn handle_record(&mut self, record: &RawRecord) -> Result<()> {
        let Some(kind) = classify(record.flags) else {
            self.correlator.clear();
            self.output.error(format_args!(
                "Unrecognized event with mask {:x}",
                record.flags.bits()
            ))?;
            return Ok(());
        };

        if !needs_directory(kind) {
            return self.handle_tree_wide(kind, record);
        }

        let Some(located) = locate(record, &self.table) else {
            debug!(
                "Dropping {} on retired watch {} ({:?})",
                kind, record.watch_id, record.name
            );
            return Ok(());
        };

        let is_directory = record.is_directory();
        let Located {
            directory,
            fullpath,
        } = located;

        match kind {
            EventKind::CloseWrite | EventKind::Delete | EventKind::MoveSelf => {
                self.emit(ChangeEvent::at(kind, &directory, &fullpath, is_directory))?;
            }
            EventKind::Create => {
                self.emit(ChangeEvent::at(kind, &directory, &fullpath, is_directory))?;
                if is_directory {
                    self.walker().watch_tree(&fullpath, true)?;
                }
            }
            EventKind::Ignored | EventKind::DeleteSelf => {
                self.emit(ChangeEvent::at(kind, &directory, &fullpath, is_directory))?;
                self.table.remove(record.watch_id);
            }
            EventKind::MovedFrom => {
                self.emit(ChangeEvent::at(kind, &directory, &fullpath, is_directory))?;
                self.correlator.on_moved_from(record.cookie, fullpath);
            }
            EventKind::MovedTo => {
                self.emit(ChangeEvent::at(kind, &directory, &fullpath, is_directory))?;
                let resolution = self.correlator.on_moved_to(record.cookie, fullpath);
                self.handle_move(&directory, resolution, is_directory)?;
            }
            EventKind::Access
            | EventKind::Attrib
            | EventKind::CloseNowrite
            | EventKind::Modify
            | EventKind::Open => {}
            EventKind::Unmount | EventKind::Overflow | EventKind::Move => {}
        }

        Ok(())
    }

    /// Watch table
    pub fn table(&self) -> &WatchTable {
        &self.table
    }

    /// Rename correlator
    pub fn correlator(&self) -> &MoveCorrelator {
        &self.correlator
    }

    /// Output stream
    pub fn output(&self) -> &Output<W> {
        &self.output
    }

    /// Notification service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Records that don't belong to a single watched directory
    fn handle_tree_wide(&mut self, kind: EventKind, record: &RawRecord) -> Result<()> {
        match kind {
            EventKind::Unmount => {
                warn!("Watched filesystem unmounted; dropping {} watch(es)", self.table.len());
                self.table.reset_all();
                self.emit(ChangeEvent::bare(kind, record.is_directory()))
            }
            EventKind::Overflow => {
                warn!("Notification queue overflow");
                self.output
                    .warning(format_args!("Event queue overflow, some events were lost"))?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Emit the MOVE and re-establish coverage of a moved-in directory
    fn handle_move(
        &mut self,
        directory: &OsStr,
        resolution: MoveResolution,
        is_directory: bool,
    ) -> Result<()> {
        self.emit(ChangeEvent {
            kind: EventKind::Move,
            directory: directory.to_os_string(),
            from: resolution.from_path().to_os_string(),
            to: resolution.to_path().to_os_string(),
            is_directory,
        })?;

        if !is_directory {
            return Ok(());
        }

        if let MoveResolution::Resolved { from, to } = &resolution {
            let rewritten = self.table.rewrite_prefix(from, to);
            debug!("Rewrote {} watched path(s) from {:?} to {:?}", rewritten, from, to);
        }

        let started = Instant::now();
        self.walker().watch_tree(resolution.to_path(), true)?;
        if self.policy.stats {
            self.output.elapsed("renaming directory", started)?;
        }
        Ok(())
    }

    fn emit(&mut self, event: ChangeEvent) -> Result<()> {
        let shown = match visibility(event.kind) {
            Visibility::Always => true,
            Visibility::DebugOnly => self.policy.debug,
            Visibility::Never => false,
        };
        if shown {
            self.output.event(&event)?;
        }
        Ok(())
    }

    fn walker(&mut self) -> RecursiveWatcher<'_, S, W> {
        RecursiveWatcher::new(
            &mut self.service,
            &mut self.table,
            self.filter.as_ref(),
            &mut self.output,
        )
        .quiet(self.policy.quiet)
    }
}
