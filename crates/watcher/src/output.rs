//! Output line protocol
//!
//! Events and operator messages share one stream. Events are written as
//! `KIND[,ISDIR]:dir:from:to:`; messages carry an `info: `, `warning: ` or
//! `error: ` prefix so consumers can tell them apart.

use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use crate::event::ChangeEvent;

/// Which optional lines reach the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitPolicy {
    /// Emit housekeeping events too
    pub debug: bool,
    /// Skip watch installation announcements
    pub quiet: bool,
    /// Report walk timings
    pub stats: bool,
}

/// Line-oriented writer for events and messages
#[derive(Debug)]
pub struct Output<W> {
    writer: W,
}

impl<W: Write> Output<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write one event line
    pub fn event(&mut self, event: &ChangeEvent) -> io::Result<()> {
        event.write_line(&mut self.writer)
    }

    /// Write an `info: ` line
    pub fn info(&mut self, message: fmt::Arguments<'_>) -> io::Result<()> {
        self.message("info", message)
    }

    /// Write a `warning: ` line
    pub fn warning(&mut self, message: fmt::Arguments<'_>) -> io::Result<()> {
        self.message("warning", message)
    }

    /// Write an `error: ` line
    pub fn error(&mut self, message: fmt::Arguments<'_>) -> io::Result<()> {
        self.message("error", message)
    }

    /// Write the elapsed milliseconds since `started` for `label`
    pub fn elapsed(&mut self, label: &str, started: Instant) -> io::Result<()> {
        let millis = started.elapsed().as_millis();
        self.info(format_args!("Elapsed time (msecs), {label}: {millis}"))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn message(&mut self, level: &str, message: fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(self.writer, "{level}: {message}")
    }
}
