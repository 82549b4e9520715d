//! Rename correlation
//!
//! The kernel reports a rename as two records (moved-from in the origin
//! directory, moved-to in the destination) sharing a cookie. The correlator
//! keeps the pending origins by cookie and pairs them with incoming
//! destinations. Unmatched origins expire after a time-to-live and the table
//! is bounded, so renames out of the watched tree cannot accumulate.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::time::{Duration, Instant};

use tracing::debug;

/// Outcome of a moved-to record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResolution {
    /// Origin known: a full rename inside the watched tree
    Resolved { from: OsString, to: OsString },
    /// No matching origin (moved in from outside, or the pair was split)
    Unresolved { to: OsString },
}

impl MoveResolution {
    /// Origin path; the destination when unresolved
    pub fn from_path(&self) -> &OsStr {
        match self {
            Self::Resolved { from, .. } => from,
            Self::Unresolved { to } => to,
        }
    }

    /// Destination path
    pub fn to_path(&self) -> &OsStr {
        match self {
            Self::Resolved { to, .. } | Self::Unresolved { to } => to,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

#[derive(Debug, Clone)]
struct PendingMove {
    from_path: OsString,
    recorded_at: Instant,
}

/// Pairs moved-from and moved-to records by cookie
#[derive(Debug)]
pub struct MoveCorrelator {
    /// Pending origins by cookie
    pending: HashMap<u32, PendingMove>,

    /// Expiry for unmatched origins (None = never)
    ttl: Option<Duration>,

    /// Maximum number of pending origins
    max_pending: usize,
}

impl MoveCorrelator {
    /// Create a correlator
    pub fn new(ttl: Option<Duration>, max_pending: usize) -> Self {
        Self {
            pending: HashMap::new(),
            ttl,
            max_pending: max_pending.max(1),
        }
    }

    /// Record the origin half of a rename
    pub fn on_moved_from(&mut self, cookie: u32, path: impl Into<OsString>) {
        self.on_moved_from_at(cookie, path.into(), Instant::now());
    }

    /// Resolve the destination half of a rename
    pub fn on_moved_to(&mut self, cookie: u32, path: impl Into<OsString>) -> MoveResolution {
        self.on_moved_to_at(cookie, path.into(), Instant::now())
    }

    /// Forget every pending origin
    pub fn clear(&mut self) {
        if !self.pending.is_empty() {
            debug!("Clearing {} pending move(s)", self.pending.len());
        }
        self.pending.clear();
    }

    /// Number of origins waiting for their destination
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn on_moved_from_at(&mut self, cookie: u32, from_path: OsString, now: Instant) {
        self.expire(now);

        if !self.pending.contains_key(&cookie) && self.pending.len() >= self.max_pending {
            self.evict_oldest();
        }

        if let Some(previous) = self.pending.insert(
            cookie,
            PendingMove {
                from_path,
                recorded_at: now,
            },
        ) {
            debug!(
                "Cookie {} reused; dropping unmatched origin {:?}",
                cookie, previous.from_path
            );
        }
    }

    pub(crate) fn on_moved_to_at(&mut self, cookie: u32, to: OsString, now: Instant) -> MoveResolution {
        self.expire(now);

        match self.pending.remove(&cookie) {
            Some(origin) => MoveResolution::Resolved {
                from: origin.from_path,
                to,
            },
            None => MoveResolution::Unresolved { to },
        }
    }

    fn expire(&mut self, now: Instant) {
        let Some(ttl) = self.ttl else {
            return;
        };

        self.pending.retain(|cookie, pending| {
            let alive = now.saturating_duration_since(pending.recorded_at) <= ttl;
            if !alive {
                debug!(
                    "Expiring unmatched move {:?} (cookie {})",
                    pending.from_path, cookie
                );
            }
            alive
        });
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .pending
            .iter()
            .min_by_key(|(_, pending)| pending.recorded_at)
            .map(|(cookie, _)| *cookie);

        if let Some(cookie) = oldest {
            if let Some(evicted) = self.pending.remove(&cookie) {
                debug!(
                    "Pending move table full; evicting {:?} (cookie {})",
                    evicted.from_path, cookie
                );
            }
        }
    }
}

impl Default for MoveCorrelator {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(5)), 1024)
    }
}
