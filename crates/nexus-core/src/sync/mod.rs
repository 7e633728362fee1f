//! Offline write-queue and sync engine
//!
//! Local mutations that cannot reach the backend are buffered as
//! [`SyncOperation`]s, persisted across restarts, and replayed in FIFO order
//! once connectivity returns. Replay retries each operation up to a ceiling,
//! then drops it and surfaces the failure to subscribers. Conflicts between
//! local and remote copies of a record resolve by last-write-wins.

mod conflict;
mod executor;
mod manager;
mod monitor;
mod operation;
mod queue;
#[cfg(test)]
pub(crate) mod test_support;

pub use conflict::{resolve_conflict, Timestamped};
pub use executor::{PassOutcome, SyncExecutor};
pub use manager::{SyncManager, SyncStatus};
pub use monitor::{ConnectivityState, Transition};
pub use operation::{Operation, OperationId, OperationKind, SyncOperation};
pub use queue::{JsonFileQueueStore, MemoryQueueStore, OperationQueue, QueueStore};
