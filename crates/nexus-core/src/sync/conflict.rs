//! Last-write-wins conflict resolution
//!
//! Picks between a locally cached and a freshly fetched copy of the same
//! logical record. Pure comparison; callers persist the winner themselves.

use crate::models::{Chat, Context, Message};

/// Records that carry modification timestamps.
pub trait Timestamped {
    /// Last update timestamp (Unix ms), when the record tracks one
    fn updated_at(&self) -> Option<i64>;

    /// Creation timestamp (Unix ms)
    fn created_at(&self) -> i64;

    /// Effective modification time: `updated_at`, falling back to creation.
    fn modified_at(&self) -> i64 {
        self.updated_at().unwrap_or_else(|| self.created_at())
    }
}

impl Timestamped for Chat {
    fn updated_at(&self) -> Option<i64> {
        Some(self.updated_at)
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl Timestamped for Message {
    // Messages are immutable apart from status; only creation time is tracked.
    fn updated_at(&self) -> Option<i64> {
        None
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl Timestamped for Context {
    fn updated_at(&self) -> Option<i64> {
        Some(self.updated_at)
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }
}

/// Pick the authoritative copy of a record by last-write-wins.
///
/// Local wins only when strictly newer; ties go to the remote copy.
#[must_use]
pub fn resolve_conflict<'a, T: Timestamped>(local: &'a T, remote: &'a T) -> &'a T {
    if local.modified_at() > remote.modified_at() {
        local
    } else {
        remote
    }
}
