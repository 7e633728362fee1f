//! Sync manager
//!
//! Ties the queue, executor, and connectivity state together behind one
//! clone-shareable handle. Constructed explicitly at application startup and
//! torn down with [`SyncManager::shutdown`]; there is no process-wide
//! singleton, so tests run isolated instances.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::config::SyncConfig;
use crate::store::DocumentStore;

use super::executor::SyncExecutor;
use super::monitor::{ConnectivityState, Transition};
use super::operation::{Operation, SyncOperation};
use super::queue::{OperationQueue, QueueStore};

const FAILURE_CHANNEL_CAPACITY: usize = 32;

/// Read-only snapshot of the engine, for diagnostics and UI indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub queue_length: usize,
    pub is_online: bool,
    pub is_syncing: bool,
}

struct Inner {
    executor: SyncExecutor,
    queue: Mutex<OperationQueue>,
    connectivity: ConnectivityState,
    is_syncing: AtomicBool,
    config: SyncConfig,
    /// Operations dropped after exhausting the retry ceiling
    failed: StdMutex<Vec<SyncOperation>>,
    failure_events: broadcast::Sender<SyncOperation>,
    ticker: StdMutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// One pass of replaying the queue against the remote store.
    ///
    /// No-op when a drain is already in progress or the queue is empty.
    async fn drain(&self) {
        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let snapshot = {
            let queue = self.queue.lock().await;
            queue.snapshot()
        };

        if snapshot.is_empty() {
            self.is_syncing.store(false, Ordering::SeqCst);
            return;
        }

        let outcome = self.executor.run_pass(snapshot.clone()).await;

        {
            let mut queue = self.queue.lock().await;
            queue.replace_snapshot(&snapshot, outcome.still_pending);
        }

        if !outcome.dropped.is_empty() {
            let mut failed = self
                .failed
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            for op in outcome.dropped {
                // No receivers is fine; the retained list keeps the record.
                let _ = self.failure_events.send(op.clone());
                failed.push(op);
            }
        }

        self.is_syncing.store(false, Ordering::SeqCst);
    }
}

/// Handle to the offline sync engine. Cheap to clone.
#[derive(Clone)]
pub struct SyncManager {
    inner: Arc<Inner>,
}

impl SyncManager {
    /// Build a manager over a remote store and a queue persistence backend.
    ///
    /// The pending queue is restored from `queue_store` immediately;
    /// call [`start`](Self::start) to arm the periodic backstop drain.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        queue_store: Box<dyn QueueStore>,
        config: SyncConfig,
    ) -> Self {
        let (failure_events, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        let queue = OperationQueue::restore(queue_store);
        if !queue.is_empty() {
            tracing::info!("Restored {} pending sync operations", queue.len());
        }

        Self {
            inner: Arc::new(Inner {
                executor: SyncExecutor::new(store, config.max_retries),
                queue: Mutex::new(queue),
                connectivity: ConnectivityState::new(config.assume_online),
                is_syncing: AtomicBool::new(false),
                config,
                failed: StdMutex::new(Vec::new()),
                failure_events,
                ticker: StdMutex::new(None),
            }),
        }
    }

    /// Arm the periodic backstop drain.
    ///
    /// Recovers operations whose immediate drain attempt failed transiently
    /// and transitions the host never reported. Idempotent only in the sense
    /// that calling it again replaces the previous ticker.
    pub fn start(&self) {
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.config.sync_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; the backstop starts one
            // full period out.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.connectivity.is_online() && !inner.queue.lock().await.is_empty() {
                    inner.drain().await;
                }
            }
        });

        let mut ticker = self
            .inner
            .ticker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = ticker.replace(handle) {
            previous.abort();
        }
    }

    /// Buffer a mutation for remote application.
    ///
    /// Call this when a direct remote write fails or the app knows it is
    /// offline. When online, a drain is fired on a background task; its
    /// outcome never propagates back to the caller.
    pub async fn enqueue(&self, op: Operation) {
        let sync_op = SyncOperation::new(op);
        tracing::debug!(
            "Queued {} operation {} for {}",
            sync_op.op.kind(),
            sync_op.id,
            sync_op.op.collection()
        );

        {
            let mut queue = self.inner.queue.lock().await;
            queue.push(sync_op);
        }

        if self.inner.connectivity.is_online() {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.drain().await;
            });
        }
    }

    /// Replay the queue now. No-op when already draining or nothing pends.
    pub async fn drain(&self) {
        self.inner.drain().await;
    }

    /// Record a connectivity signal from the host platform.
    ///
    /// A transition to online drains immediately; a transition to offline
    /// only flips the flag.
    pub async fn set_online(&self, online: bool) {
        match self.inner.connectivity.transition(online) {
            Transition::WentOnline => {
                tracing::info!("Connection restored, syncing");
                self.inner.drain().await;
            }
            Transition::WentOffline => {
                tracing::info!("Connection lost, queueing operations");
            }
            Transition::Unchanged => {}
        }
    }

    /// Snapshot of queue length and engine flags.
    pub async fn status(&self) -> SyncStatus {
        let queue_length = self.inner.queue.lock().await.len();
        SyncStatus {
            queue_length,
            is_online: self.inner.connectivity.is_online(),
            is_syncing: self.inner.is_syncing.load(Ordering::SeqCst),
        }
    }

    /// Drop every pending operation. Explicit reset, e.g. on logout.
    pub async fn clear_queue(&self) {
        self.inner.queue.lock().await.clear();
    }

    /// Operations dropped permanently after exhausting their retries.
    #[must_use]
    pub fn failed_operations(&self) -> Vec<SyncOperation> {
        self.inner
            .failed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to permanent-failure events, so a host UI can notify.
    #[must_use]
    pub fn subscribe_failures(&self) -> broadcast::Receiver<SyncOperation> {
        self.inner.failure_events.subscribe()
    }

    /// Cancel the backstop ticker and persist the queue one final time.
    pub async fn shutdown(&self) {
        let handle = self
            .inner
            .ticker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        self.inner.queue.lock().await.persist();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::sync::Semaphore;

    use crate::models::{Chat, ChatId, Message, MessageRole, MessageStatus};
    use crate::sync::queue::{JsonFileQueueStore, MemoryQueueStore};
    use crate::sync::test_support::FlakyStore;

    use super::*;

    fn offline_config() -> SyncConfig {
        SyncConfig {
            assume_online: false,
            ..SyncConfig::default()
        }
    }

    fn manager_with(store: Arc<FlakyStore>, config: SyncConfig) -> SyncManager {
        SyncManager::new(store, Box::new(MemoryQueueStore::new()), config)
    }

    fn create_message_op() -> Operation {
        Operation::CreateMessage {
            message: Message::new(ChatId::new(), "user-1", "hi", MessageRole::User),
        }
    }

    async fn wait_until_drained(manager: &SyncManager) {
        for _ in 0..200 {
            let status = manager.status().await;
            if status.queue_length == 0 && !status.is_syncing {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("queue never drained");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_enqueue_then_online_transition_drains() {
        let store = Arc::new(FlakyStore::succeeding());
        let manager = manager_with(store.clone(), offline_config());

        manager.enqueue(create_message_op()).await;
        let status = manager.status().await;
        assert_eq!(status.queue_length, 1);
        assert!(!status.is_online);
        assert!(store.calls().is_empty());

        manager.set_online(true).await;

        let status = manager.status().await;
        assert_eq!(status.queue_length, 0);
        assert!(status.is_online);
        assert_eq!(store.calls().len(), 1);
        assert!(store.calls()[0].starts_with("create_message:"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn enqueue_while_online_drains_automatically() {
        let store = Arc::new(FlakyStore::succeeding());
        let manager = manager_with(store, SyncConfig::default());

        manager
            .enqueue(Operation::UpdateMessageStatus {
                id: crate::models::MessageId::new(),
                status: MessageStatus::Read,
            })
            .await;

        wait_until_drained(&manager).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn always_failing_operation_is_dropped_after_max_retries() {
        let store = Arc::new(FlakyStore::failing_forever());
        let manager = manager_with(store.clone(), offline_config());
        let mut failures = manager.subscribe_failures();

        manager.enqueue(create_message_op()).await;

        // Passes 1 and 2: failure, still queued with retries incremented.
        manager.drain().await;
        assert_eq!(manager.status().await.queue_length, 1);
        manager.drain().await;
        assert_eq!(manager.status().await.queue_length, 1);

        // Pass 3 hits the ceiling: dropped, never retried again.
        manager.drain().await;
        assert_eq!(manager.status().await.queue_length, 0);
        assert_eq!(store.calls().len(), 3);

        manager.drain().await;
        assert_eq!(store.calls().len(), 3);

        let dropped = manager.failed_operations();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].retries, 3);

        let event = failures.try_recv().unwrap();
        assert_eq!(event.id, dropped[0].id);
        assert!(failures.try_recv().is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn operation_succeeding_on_second_attempt_is_removed() {
        let store = Arc::new(FlakyStore::succeed_after_failures(1));
        let manager = manager_with(store, offline_config());

        manager.enqueue(create_message_op()).await;

        manager.drain().await;
        assert_eq!(manager.status().await.queue_length, 1);

        manager.drain().await;
        assert_eq!(manager.status().await.queue_length, 0);
        assert!(manager.failed_operations().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_drain_is_a_no_op() {
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(FlakyStore::gated(gate.clone()));
        let manager = manager_with(store.clone(), offline_config());

        manager.enqueue(create_message_op()).await;

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.drain().await })
        };

        // Wait for the first drain to be blocked inside the remote call.
        for _ in 0..200 {
            if manager.status().await.is_syncing {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(manager.status().await.is_syncing);

        // Redundant drain returns immediately without touching the queue.
        manager.drain().await;
        assert_eq!(manager.status().await.queue_length, 1);
        assert_eq!(store.calls().len(), 1);

        gate.add_permits(1);
        first.await.unwrap();
        assert_eq!(manager.status().await.queue_length, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn queue_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync-queue.json");

        {
            let store = Arc::new(FlakyStore::succeeding());
            let manager = SyncManager::new(
                store,
                Box::new(JsonFileQueueStore::new(&path)),
                offline_config(),
            );
            manager.enqueue(create_message_op()).await;
            manager.enqueue(create_message_op()).await;
            manager.shutdown().await;
        }

        let store = Arc::new(FlakyStore::succeeding());
        let manager = SyncManager::new(
            store,
            Box::new(JsonFileQueueStore::new(&path)),
            offline_config(),
        );
        assert_eq!(manager.status().await.queue_length, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clear_queue_resets_pending_operations() {
        let store = Arc::new(FlakyStore::succeeding());
        let manager = manager_with(store.clone(), offline_config());

        manager.enqueue(create_message_op()).await;
        manager
            .enqueue(Operation::CreateChat {
                chat: Chat::new("user-1", "Thread", Vec::new()),
            })
            .await;
        assert_eq!(manager.status().await.queue_length, 2);

        manager.clear_queue().await;
        assert_eq!(manager.status().await.queue_length, 0);

        manager.set_online(true).await;
        assert!(store.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn backstop_ticker_retries_transient_failures() {
        // Immediate drain on the online transition fails once; the periodic
        // ticker picks the operation up on the next interval.
        let store = Arc::new(FlakyStore::succeed_after_failures(1));
        let manager = manager_with(store.clone(), offline_config());

        manager.enqueue(create_message_op()).await;
        manager.set_online(true).await;
        assert_eq!(manager.status().await.queue_length, 1);

        manager.start();
        // Let the ticker task poll its interval once so its epoch is set
        // before the clock jumps.
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tokio::time::advance(Duration::from_secs(31)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        assert_eq!(manager.status().await.queue_length, 0);
        assert_eq!(store.calls().len(), 2);
        manager.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn set_online_while_offline_does_not_drain_twice() {
        let store = Arc::new(FlakyStore::succeeding());
        let manager = manager_with(store.clone(), offline_config());

        manager.enqueue(create_message_op()).await;
        manager.set_online(false).await;
        assert_eq!(manager.status().await.queue_length, 1);
        assert!(store.calls().is_empty());
    }
}
