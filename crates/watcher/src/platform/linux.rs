//! Linux inotify notification service
//!
//! Uses the raw inotify syscalls through `libc`. The descriptor is blocking:
//! `read_batch` parks the dispatch loop until the kernel has records.

use std::ffi::{CString, OsString};
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, WatcherError};
use crate::service::{EventMask, NotificationService, RawRecord, WatchId};

/// Read buffer size; large enough for any single record with a maximal name
const BUFFER_SIZE: usize = 16 * 1024;

/// Size of the fixed `struct inotify_event` header
const HEADER_SIZE: usize = 16;

/// Blocking inotify instance
pub struct InotifyService {
    fd: OwnedFd,
    buffer: Vec<u8>,
}

impl InotifyService {
    /// Create a new inotify instance
    pub fn new() -> Result<Self> {
        // SAFETY: inotify_init1 takes no pointers; the result is checked below.
        let fd = unsafe { libc::inotify_init1(libc::IN_CLOEXEC) };
        if fd < 0 {
            return Err(WatcherError::Init(io::Error::last_os_error()));
        }

        debug!("inotify initialized (fd {})", fd);
        Ok(Self {
            // SAFETY: fd is a freshly created descriptor nobody else owns.
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
            buffer: vec![0; BUFFER_SIZE],
        })
    }
}

impl NotificationService for InotifyService {
    fn add_watch(&mut self, path: &Path, mask: EventMask) -> io::Result<WatchId> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
        let wd = unsafe { libc::inotify_add_watch(self.fd.as_raw_fd(), c_path.as_ptr(), mask.bits()) };
        if wd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(wd)
    }

    fn read_batch(&mut self) -> io::Result<Vec<RawRecord>> {
        loop {
            // SAFETY: the buffer is valid for writes of its full length.
            let read = unsafe {
                libc::read(
                    self.fd.as_raw_fd(),
                    self.buffer.as_mut_ptr().cast::<libc::c_void>(),
                    self.buffer.len(),
                )
            };

            if read < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }

            let len = usize::try_from(read).unwrap_or(0);
            return Ok(parse_records(&self.buffer[..len]));
        }
    }
}

/// Decode a buffer of packed `struct inotify_event` records.
///
/// A truncated trailing record is dropped.
pub(crate) fn parse_records(buffer: &[u8]) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut offset = 0;

    while offset + HEADER_SIZE <= buffer.len() {
        let (Some(wd), Some(mask), Some(cookie), Some(name_len)) = (
            read_u32(buffer, offset),
            read_u32(buffer, offset + 4),
            read_u32(buffer, offset + 8),
            read_u32(buffer, offset + 12),
        ) else {
            break;
        };

        let name_start = offset + HEADER_SIZE;
        let name_end = name_start + name_len as usize;
        let Some(raw_name) = buffer.get(name_start..name_end) else {
            debug!("Truncated inotify record at offset {}", offset);
            break;
        };

        // Names are NUL-padded to alignment
        let name_bytes = raw_name.split(|b| *b == 0).next().unwrap_or_default();
        let name = (!name_bytes.is_empty()).then(|| OsString::from_vec(name_bytes.to_vec()));

        records.push(RawRecord {
            watch_id: wd as WatchId,
            flags: EventMask::from_bits_retain(mask),
            cookie,
            name,
        });

        offset = name_end;
    }

    records
}

fn read_u32(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes = buffer.get(offset..offset + 4)?;
    Some(u32::from_ne_bytes(bytes.try_into().ok()?))
}
