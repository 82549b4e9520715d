//! Record classification
//!
//! Maps a raw flag set to exactly one [`EventKind`] and resolves the affected
//! path through the watch table.

use std::ffi::OsString;

use crate::event::EventKind;
use crate::service::{EventMask, RawRecord};
use crate::table::{join_dir, normalize_dir, WatchTable};

/// When an event of a given kind reaches the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    DebugOnly,
    Never,
}

/// Classify a flag set; `None` means an unrecognized combination
pub fn classify(flags: EventMask) -> Option<EventKind> {
    let flags = flags.intersection(EventMask::CLASSIFIED);

    let kind = if flags == EventMask::UNMOUNT {
        EventKind::Unmount
    } else if flags == EventMask::Q_OVERFLOW {
        EventKind::Overflow
    } else if flags == EventMask::IGNORED {
        EventKind::Ignored
    } else if flags == EventMask::ACCESS {
        EventKind::Access
    } else if flags == EventMask::ATTRIB {
        EventKind::Attrib
    } else if flags == EventMask::CLOSE_WRITE {
        EventKind::CloseWrite
    } else if flags == EventMask::CLOSE_NOWRITE {
        EventKind::CloseNowrite
    } else if flags == EventMask::CREATE {
        EventKind::Create
    } else if flags == EventMask::DELETE {
        EventKind::Delete
    } else if flags == EventMask::DELETE_SELF {
        EventKind::DeleteSelf
    } else if flags == EventMask::MODIFY {
        EventKind::Modify
    } else if flags == EventMask::MOVE_SELF {
        EventKind::MoveSelf
    } else if flags == EventMask::MOVED_FROM {
        EventKind::MovedFrom
    } else if flags == EventMask::MOVED_TO {
        EventKind::MovedTo
    } else if flags == EventMask::OPEN {
        EventKind::Open
    } else {
        return None;
    };

    Some(kind)
}

/// Emission rule for a kind
pub fn visibility(kind: EventKind) -> Visibility {
    match kind {
        EventKind::Unmount
        | EventKind::CloseWrite
        | EventKind::Create
        | EventKind::Delete
        | EventKind::Move => Visibility::Always,
        EventKind::Ignored
        | EventKind::DeleteSelf
        | EventKind::MoveSelf
        | EventKind::MovedFrom
        | EventKind::MovedTo => Visibility::DebugOnly,
        EventKind::Overflow
        | EventKind::Access
        | EventKind::Attrib
        | EventKind::CloseNowrite
        | EventKind::Modify
        | EventKind::Open => Visibility::Never,
    }
}

/// Whether handling `kind` needs the watched directory of the record
pub fn needs_directory(kind: EventKind) -> bool {
    !matches!(kind, EventKind::Unmount | EventKind::Overflow)
}

/// A record with its watched directory resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// Watched directory (separator-terminated)
    pub directory: OsString,

    /// Affected path; directories get a trailing separator
    pub fullpath: OsString,
}

/// Resolve the directory and affected path of `record`.
///
/// Returns `None` when the watch id is unknown (already retired).
pub fn locate(record: &RawRecord, table: &WatchTable) -> Option<Located> {
    let directory = table.lookup(record.watch_id)?;

    let fullpath = match record.name.as_deref() {
        Some(name) if record.is_directory() => normalize_dir(&join_dir(directory, name)),
        Some(name) => join_dir(directory, name),
        None => directory.to_os_string(),
    };

    Some(Located {
        directory: directory.to_os_string(),
        fullpath,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flags_classified() {
        assert_eq!(classify(EventMask::CREATE), Some(EventKind::Create));
        assert_eq!(classify(EventMask::CLOSE_WRITE), Some(EventKind::CloseWrite));
        assert_eq!(classify(EventMask::MOVED_FROM), Some(EventKind::MovedFrom));
        assert_eq!(classify(EventMask::MOVED_TO), Some(EventKind::MovedTo));
        assert_eq!(classify(EventMask::IGNORED), Some(EventKind::Ignored));
        assert_eq!(classify(EventMask::UNMOUNT), Some(EventKind::Unmount));
        assert_eq!(classify(EventMask::Q_OVERFLOW), Some(EventKind::Overflow));
        assert_eq!(classify(EventMask::MODIFY), Some(EventKind::Modify));
    }

    #[test]
    fn test_isdir_does_not_affect_kind() {
        assert_eq!(
            classify(EventMask::CREATE | EventMask::ISDIR),
            Some(EventKind::Create)
        );
        assert_eq!(
            classify(EventMask::MOVED_TO | EventMask::ISDIR),
            Some(EventKind::MovedTo)
        );
    }

    #[test]
    fn test_combined_flags_unrecognized() {
        assert_eq!(classify(EventMask::CREATE | EventMask::DELETE), None);
        assert_eq!(classify(EventMask::empty()), None);
        assert_eq!(classify(EventMask::from_bits_retain(0x0100_0000)), None);
    }

    #[test]
    fn test_visibility_rules() {
        assert_eq!(visibility(EventKind::Create), Visibility::Always);
        assert_eq!(visibility(EventKind::Move), Visibility::Always);
        assert_eq!(visibility(EventKind::MovedFrom), Visibility::DebugOnly);
        assert_eq!(visibility(EventKind::Ignored), Visibility::DebugOnly);
        assert_eq!(visibility(EventKind::Modify), Visibility::Never);
    }

    #[test]
    fn test_locate_paths() {
        let mut table = WatchTable::new(16);
        table.install(1, "/data").unwrap();

        let file = RawRecord::new(1, EventMask::CLOSE_WRITE).with_name("a.txt");
        let located = locate(&file, &table).unwrap();
        assert_eq!(located.directory, "/data/");
        assert_eq!(located.fullpath, "/data/a.txt");

        let dir = RawRecord::new(1, EventMask::CREATE | EventMask::ISDIR).with_name("sub");
        assert_eq!(locate(&dir, &table).unwrap().fullpath, "/data/sub/");

        let own = RawRecord::new(1, EventMask::MOVE_SELF);
        assert_eq!(locate(&own, &table).unwrap().fullpath, "/data/");
    }

    #[test]
    fn test_locate_non_utf8_directory() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut table = WatchTable::new(16);
        table.install(1, "/data").unwrap();

        let record = RawRecord::new(1, EventMask::CREATE | EventMask::ISDIR)
            .with_name(OsStr::from_bytes(b"bad\xff"));
        let located = locate(&record, &table).unwrap();

        assert_eq!(located.fullpath.as_bytes(), b"/data/bad\xff/");
    }

    #[test]
    fn test_locate_unknown_watch() {
        let table = WatchTable::new(16);
        let record = RawRecord::new(9, EventMask::DELETE).with_name("gone");
        assert_eq!(locate(&record, &table), None);
    }
}
