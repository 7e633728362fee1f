//! Scriptable store doubles shared by the sync engine tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{broadcast, Semaphore};

use crate::error::{Error, Result};
use crate::models::{
    Chat, ChatId, ChatPatch, Collection, Context, ContextCategory, ContextFilters, ContextId,
    ContextPatch, Message, MessageId, MessageRole, MessageStatus,
};
use crate::store::{ChangeEvent, DocumentStore};

/// A store whose failure behavior is scripted per test.
///
/// Every mutation funnels through [`FlakyStore::attempt`], which records the
/// call, optionally waits on a gate, and fails while the failure budget
/// lasts.
pub struct FlakyStore {
    /// Remaining calls to fail; negative means fail forever
    fail_remaining: AtomicI64,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
    events: broadcast::Sender<ChangeEvent>,
}

impl FlakyStore {
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with_failures(0)
    }

    #[must_use]
    pub fn failing_forever() -> Self {
        Self::with_failures(-1)
    }

    /// Fail the first `count` calls, then succeed.
    #[must_use]
    pub fn succeed_after_failures(count: i64) -> Self {
        Self::with_failures(count)
    }

    /// A succeeding store that blocks each call on a semaphore permit.
    #[must_use]
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        let mut store = Self::with_failures(0);
        store.gate = Some(gate);
        store
    }

    fn with_failures(fail_remaining: i64) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            fail_remaining: AtomicI64::new(fail_remaining),
            calls: Mutex::new(Vec::new()),
            gate: None,
            events,
        }
    }

    /// Labels of every store call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn attempt(&self, label: String) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(label);

        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|_| {
                Error::Remote("gate closed".to_string())
            })?;
            permit.forget();
        }

        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining < 0 {
            return Err(Error::Remote("scripted failure".to_string()));
        }
        if remaining > 0 {
            self.fail_remaining.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::Remote("scripted failure".to_string()));
        }
        Ok(())
    }

    fn placeholder_chat() -> Chat {
        Chat::new("test-user", "placeholder", Vec::new())
    }

    fn placeholder_message() -> Message {
        Message::new(ChatId::new(), "test-user", "placeholder", MessageRole::User)
    }

    fn placeholder_context() -> Context {
        Context::new(
            "test-user",
            "placeholder",
            "placeholder",
            ContextCategory::Custom,
        )
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat> {
        self.attempt(format!("create_chat:{}", chat.name)).await?;
        Ok(chat.clone())
    }

    async fn update_chat(&self, id: &ChatId, _patch: ChatPatch) -> Result<Chat> {
        self.attempt(format!("update_chat:{id}")).await?;
        Ok(Self::placeholder_chat())
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<()> {
        self.attempt(format!("delete_chat:{id}")).await
    }

    async fn list_chats(&self, _user_id: &str, _archived: bool) -> Result<Vec<Chat>> {
        Ok(Vec::new())
    }

    async fn create_message(&self, message: &Message) -> Result<Message> {
        self.attempt(format!("create_message:{}", message.content))
            .await?;
        Ok(message.clone())
    }

    async fn update_message_status(
        &self,
        id: &MessageId,
        _status: MessageStatus,
    ) -> Result<Message> {
        self.attempt(format!("update_message_status:{id}")).await?;
        Ok(Self::placeholder_message())
    }

    async fn delete_message(&self, id: &MessageId) -> Result<()> {
        self.attempt(format!("delete_message:{id}")).await
    }

    async fn list_messages(
        &self,
        _chat_id: &ChatId,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<Message>> {
        Ok(Vec::new())
    }

    async fn create_context(&self, context: &Context) -> Result<Context> {
        self.attempt(format!("create_context:{}", context.title))
            .await?;
        Ok(context.clone())
    }

    async fn update_context(&self, id: &ContextId, _patch: ContextPatch) -> Result<Context> {
        self.attempt(format!("update_context:{id}")).await?;
        Ok(Self::placeholder_context())
    }

    async fn delete_context(&self, id: &ContextId) -> Result<()> {
        self.attempt(format!("delete_context:{id}")).await
    }

    async fn list_contexts(
        &self,
        _user_id: &str,
        _filters: ContextFilters,
    ) -> Result<Vec<Context>> {
        Ok(Vec::new())
    }

    fn subscribe(&self, _collection: Collection) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}
