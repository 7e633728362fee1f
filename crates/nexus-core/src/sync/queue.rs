//! Operation queue and its persistence
//!
//! The queue is the sole source of truth for what still needs to sync. It is
//! rebuilt from persisted storage on startup and overwritten on every
//! mutation. Persistence failures are logged and swallowed; the in-memory
//! queue stays authoritative for the current session.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

use super::operation::SyncOperation;

/// Storage backend for the serialized queue.
///
/// The whole queue is written as one flat ordered list under a single
/// well-known location, fully replaced on every save.
pub trait QueueStore: Send + Sync {
    /// Read the persisted queue. `Ok(empty)` when nothing was saved yet.
    fn load(&self) -> Result<Vec<SyncOperation>>;

    /// Replace the persisted queue with `ops`.
    fn save(&self, ops: &[SyncOperation]) -> Result<()>;
}

/// Queue persistence in a single JSON file.
pub struct JsonFileQueueStore {
    path: PathBuf,
}

impl JsonFileQueueStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueueStore for JsonFileQueueStore {
    fn load(&self) -> Result<Vec<SyncOperation>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, ops: &[SyncOperation]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(ops)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Queue persistence in memory, for tests.
///
/// Holds the raw serialized payload so tests can inject malformed contents.
#[derive(Default)]
pub struct MemoryQueueStore {
    raw: Mutex<Option<String>>,
    fail_saves: bool,
}

impl MemoryQueueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose saves always fail, for exercising the log-and-continue
    /// persistence path.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            raw: Mutex::new(None),
            fail_saves: true,
        }
    }

    /// A store pre-seeded with a raw payload (possibly invalid JSON).
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            fail_saves: false,
        }
    }

    fn raw(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl QueueStore for MemoryQueueStore {
    fn load(&self) -> Result<Vec<SyncOperation>> {
        match self.raw().as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, ops: &[SyncOperation]) -> Result<()> {
        if self.fail_saves {
            return Err(Error::Persistence("save disabled".to_string()));
        }
        *self.raw() = Some(serde_json::to_string(ops)?);
        Ok(())
    }
}

/// In-memory ordered list of pending operations, mirrored to a [`QueueStore`].
pub struct OperationQueue {
    ops: Vec<SyncOperation>,
    store: Box<dyn QueueStore>,
}

impl OperationQueue {
    /// Rebuild the queue from persisted storage.
    ///
    /// Absent or unparsable contents initialize an empty queue; startup
    /// never fails on a bad queue file.
    pub fn restore(store: Box<dyn QueueStore>) -> Self {
        let ops = match store.load() {
            Ok(ops) => ops,
            Err(error) => {
                tracing::warn!("Failed to load sync queue, starting empty: {error}");
                Vec::new()
            }
        };
        Self { ops, store }
    }

    /// Append an operation and persist.
    pub fn push(&mut self, op: SyncOperation) {
        self.ops.push(op);
        self.persist();
    }

    /// Clone the current contents in FIFO order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SyncOperation> {
        self.ops.clone()
    }

    /// Replace a processed snapshot with its still-pending remainder.
    ///
    /// Operations enqueued while the snapshot was being replayed are kept,
    /// after the remainder, preserving overall FIFO order.
    pub fn replace_snapshot(&mut self, snapshot: &[SyncOperation], still_pending: Vec<SyncOperation>) {
        let mut next = still_pending;
        next.extend(
            self.ops
                .drain(..)
                .filter(|op| !snapshot.iter().any(|seen| seen.id == op.id)),
        );
        self.ops = next;
        self.persist();
    }

    /// Empty the queue and persist the empty state.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.persist();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Write the current contents through to the store.
    ///
    /// Failures are logged only; the in-memory queue remains authoritative.
    pub fn persist(&self) {
        if let Err(error) = self.store.save(&self.ops) {
            tracing::warn!("Failed to persist sync queue: {error}");
        }
    }
}
