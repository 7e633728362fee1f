//! Replay of queued operations against the remote store

use std::sync::Arc;

use crate::error::Result;
use crate::store::DocumentStore;

use super::operation::{Operation, SyncOperation};

/// Outcome of one drain pass over a queue snapshot.
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Operations that failed but stay queued for the next pass
    pub still_pending: Vec<SyncOperation>,
    /// Operations dropped after exhausting the retry ceiling
    pub dropped: Vec<SyncOperation>,
    /// Operations applied remotely this pass
    pub applied: usize,
}

/// Replays batches of queued operations, one at a time.
///
/// Execution within a pass is serialized: each remote call is awaited before
/// the next starts, so FIFO order holds and an operation can never race a
/// duplicate in-flight attempt of itself.
pub struct SyncExecutor {
    store: Arc<dyn DocumentStore>,
    max_retries: u32,
}

impl SyncExecutor {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, max_retries: u32) -> Self {
        Self { store, max_retries }
    }

    /// Attempt every operation in `batch` in FIFO order.
    ///
    /// Any remote error counts as a retryable failure; an operation that
    /// reaches the retry ceiling is dropped permanently and reported in
    /// [`PassOutcome::dropped`].
    pub async fn run_pass(&self, batch: Vec<SyncOperation>) -> PassOutcome {
        let mut outcome = PassOutcome::default();

        for mut op in batch {
            match self.execute(&op.op).await {
                Ok(()) => {
                    tracing::info!(
                        "Synced {} operation for {}",
                        op.op.kind(),
                        op.op.collection()
                    );
                    outcome.applied += 1;
                }
                Err(error) => {
                    tracing::warn!("Sync failed for operation {}: {error}", op.id);
                    op.retries += 1;

                    if op.retries < self.max_retries {
                        outcome.still_pending.push(op);
                    } else {
                        tracing::error!(
                            "Operation {} failed after {} retries, dropping",
                            op.id,
                            self.max_retries
                        );
                        outcome.dropped.push(op);
                    }
                }
            }
        }

        outcome
    }

    /// Dispatch one mutation to the store call it targets.
    async fn execute(&self, op: &Operation) -> Result<()> {
        match op {
            Operation::CreateChat { chat } => {
                self.store.create_chat(chat).await?;
            }
            Operation::UpdateChat { id, patch } => {
                self.store.update_chat(id, patch.clone()).await?;
            }
            Operation::DeleteChat { id } => {
                self.store.delete_chat(id).await?;
            }
            Operation::CreateMessage { message } => {
                self.store.create_message(message).await?;
            }
            Operation::UpdateMessageStatus { id, status } => {
                self.store.update_message_status(id, *status).await?;
            }
            Operation::DeleteMessage { id } => {
                self.store.delete_message(id).await?;
            }
            Operation::CreateContext { context } => {
                self.store.create_context(context).await?;
            }
            Operation::UpdateContext { id, patch } => {
                self.store.update_context(id, patch.clone()).await?;
            }
            Operation::DeleteContext { id } => {
                self.store.delete_context(id).await?;
            }
        }
        Ok(())
    }
}
