//! Semantic change events

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

/// Field separator of the output line protocol
pub const FIELD_SEPARATOR: u8 = b':';

/// Semantic kind of a record or an emitted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Filesystem holding the watched tree was unmounted
    Unmount,
    /// Kernel queue overflowed; events were lost
    Overflow,
    /// Watch was retired by the kernel
    Ignored,
    Access,
    Attrib,
    /// File opened for writing was closed
    CloseWrite,
    CloseNowrite,
    /// Entry created
    Create,
    /// Entry deleted
    Delete,
    /// Watched directory itself was deleted
    DeleteSelf,
    Modify,
    /// Watched directory itself was moved
    MoveSelf,
    /// First half of a rename
    MovedFrom,
    /// Second half of a rename
    MovedTo,
    Open,
    /// Correlated rename (synthesized from a moved-to record)
    Move,
}

impl EventKind {
    /// Name used on the output line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmount => "UNMOUNT",
            Self::Overflow => "OVERFLOW",
            Self::Ignored => "IGNORED",
            Self::Access => "ACCESS",
            Self::Attrib => "ATTRIB",
            Self::CloseWrite => "CLOSE_WRITE",
            Self::CloseNowrite => "CLOSE_NOWRITE",
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::DeleteSelf => "DELETE_SELF",
            Self::Modify => "MODIFY",
            Self::MoveSelf => "MOVE_SELF",
            Self::MovedFrom => "MOVED_FROM",
            Self::MovedTo => "MOVED_TO",
            Self::Open => "OPEN",
            Self::Move => "MOVE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: EventKind,

    /// Watched directory the record was reported on
    pub directory: OsString,

    /// Origin path (equal to `to` for everything but a resolved move)
    pub from: OsString,

    /// Destination / affected path
    pub to: OsString,

    /// Whether the affected entry is a directory
    pub is_directory: bool,
}

impl ChangeEvent {
    /// Event whose origin and destination are the same path
    pub fn at(
        kind: EventKind,
        directory: impl AsRef<OsStr>,
        path: impl AsRef<OsStr>,
        is_directory: bool,
    ) -> Self {
        let path = path.as_ref();
        Self {
            kind,
            directory: directory.as_ref().to_os_string(),
            from: path.to_os_string(),
            to: path.to_os_string(),
            is_directory,
        }
    }

    /// Event with empty path fields (tree-wide conditions)
    pub fn bare(kind: EventKind, is_directory: bool) -> Self {
        Self::at(kind, "", "", is_directory)
    }

    /// Write `KIND[,ISDIR]:directory:from:to:` and a newline.
    ///
    /// Paths go out as their raw bytes.
    pub fn write_line<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.kind.as_str().as_bytes())?;
        if self.is_directory {
            writer.write_all(b",ISDIR")?;
        }
        for field in [&self.directory, &self.from, &self.to] {
            writer.write_all(&[FIELD_SEPARATOR])?;
            writer.write_all(field.as_bytes())?;
        }
        writer.write_all(&[FIELD_SEPARATOR, b'\n'])
    }
}

/// Line form with paths decoded lossily, for logs
impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = char::from(FIELD_SEPARATOR);
        write!(f, "{}", self.kind)?;
        if self.is_directory {
            f.write_str(",ISDIR")?;
        }
        write!(
            f,
            "{sep}{}{sep}{}{sep}{}{sep}",
            self.directory.to_string_lossy(),
            self.from.to_string_lossy(),
            self.to.to_string_lossy()
        )
    }
}
