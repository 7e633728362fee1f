//! In-memory document store
//!
//! Reference [`DocumentStore`] implementation backing tests and local use.
//! Mirrors the hosted backend's observable side effects: creating a message
//! rolls the parent chat's last-message fields forward, deleting a chat
//! cascades to its messages, and updates bump `updated_at`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::models::{
    Chat, ChatId, ChatPatch, Collection, Context, ContextFilters, ContextId, ContextPatch,
    Message, MessageId, MessageStatus,
};

use super::{ChangeEvent, ChangeKind, DocumentStore};

const CHANGE_CHANNEL_CAPACITY: usize = 64;
const LAST_MESSAGE_PREVIEW_CHARS: usize = 500;

#[derive(Default)]
struct Records {
    chats: HashMap<ChatId, Chat>,
    messages: HashMap<MessageId, Message>,
    contexts: HashMap<ContextId, Context>,
}

/// Thread-safe in-memory store with broadcast change notifications.
pub struct InMemoryStore {
    records: Mutex<Records>,
    chat_events: broadcast::Sender<ChangeEvent>,
    message_events: broadcast::Sender<ChangeEvent>,
    context_events: broadcast::Sender<ChangeEvent>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (chat_events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let (message_events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let (context_events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            records: Mutex::new(Records::default()),
            chat_events,
            message_events,
            context_events,
        }
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Records> {
        // Lock poisoning only happens if another holder panicked; the data
        // itself is still consistent for these whole-value operations.
        self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn publish(&self, collection: Collection, kind: ChangeKind, record_id: String) {
        let sender = match collection {
            Collection::Chats => &self.chat_events,
            Collection::Messages => &self.message_events,
            Collection::Contexts => &self.context_events,
        };
        // No receivers is fine; nobody is watching.
        let _ = sender.send(ChangeEvent {
            collection,
            kind,
            record_id,
        });
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_chat(&self, chat: &Chat) -> Result<Chat> {
        self.records().chats.insert(chat.id, chat.clone());
        self.publish(Collection::Chats, ChangeKind::Created, chat.id.as_str());
        Ok(chat.clone())
    }

    async fn update_chat(&self, id: &ChatId, patch: ChatPatch) -> Result<Chat> {
        let updated = {
            let mut records = self.records();
            let chat = records
                .chats
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(format!("chat {id}")))?;
            chat.apply(patch);
            chat.clone()
        };
        self.publish(Collection::Chats, ChangeKind::Updated, id.as_str());
        Ok(updated)
    }

    async fn delete_chat(&self, id: &ChatId) -> Result<()> {
        let removed_messages: Vec<MessageId> = {
            let mut records = self.records();
            records.chats.remove(id);
            let doomed: Vec<MessageId> = records
                .messages
                .values()
                .filter(|message| message.chat_id == *id)
                .map(|message| message.id)
                .collect();
            for message_id in &doomed {
                records.messages.remove(message_id);
            }
            doomed
        };

        for message_id in removed_messages {
            self.publish(
                Collection::Messages,
                ChangeKind::Deleted,
                message_id.as_str(),
            );
        }
        self.publish(Collection::Chats, ChangeKind::Deleted, id.as_str());
        Ok(())
    }

    async fn list_chats(&self, user_id: &str, archived: bool) -> Result<Vec<Chat>> {
        let mut chats: Vec<Chat> = self
            .records()
            .chats
            .values()
            .filter(|chat| chat.user_id == user_id && chat.archived == archived)
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    async fn create_message(&self, message: &Message) -> Result<Message> {
        {
            let mut records = self.records();
            records.messages.insert(message.id, message.clone());

            // Roll the parent chat's preview fields forward, as the hosted
            // backend does on message creation.
            if let Some(chat) = records.chats.get_mut(&message.chat_id) {
                chat.apply(ChatPatch {
                    last_message: Some(message.preview(LAST_MESSAGE_PREVIEW_CHARS)),
                    last_message_at: Some(message.created_at),
                    message_count: Some(chat.message_count + 1),
                    ..ChatPatch::default()
                });
            }
        }
        self.publish(
            Collection::Messages,
            ChangeKind::Created,
            message.id.as_str(),
        );
        Ok(message.clone())
    }

    async fn update_message_status(
        &self,
        id: &MessageId,
        status: MessageStatus,
    ) -> Result<Message> {
        let updated = {
            let mut records = self.records();
            let message = records
                .messages
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(format!("message {id}")))?;
            message.status = status;
            message.clone()
        };
        self.publish(Collection::Messages, ChangeKind::Updated, id.as_str());
        Ok(updated)
    }

    async fn delete_message(&self, id: &MessageId) -> Result<()> {
        self.records().messages.remove(id);
        self.publish(Collection::Messages, ChangeKind::Deleted, id.as_str());
        Ok(())
    }

    async fn list_messages(
        &self,
        chat_id: &ChatId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .records()
            .messages
            .values()
            .filter(|message| message.chat_id == *chat_id)
            .cloned()
            .collect();
        // Chronological order, like the chat thread screen expects.
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages.into_iter().skip(offset).take(limit).collect())
    }

    async fn create_context(&self, context: &Context) -> Result<Context> {
        self.records().contexts.insert(context.id, context.clone());
        self.publish(
            Collection::Contexts,
            ChangeKind::Created,
            context.id.as_str(),
        );
        Ok(context.clone())
    }

    async fn update_context(&self, id: &ContextId, patch: ContextPatch) -> Result<Context> {
        let updated = {
            let mut records = self.records();
            let context = records
                .contexts
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(format!("context {id}")))?;
            context.apply(patch);
            context.clone()
        };
        self.publish(Collection::Contexts, ChangeKind::Updated, id.as_str());
        Ok(updated)
    }

    async fn delete_context(&self, id: &ContextId) -> Result<()> {
        self.records().contexts.remove(id);
        self.publish(Collection::Contexts, ChangeKind::Deleted, id.as_str());
        Ok(())
    }

    async fn list_contexts(
        &self,
        user_id: &str,
        filters: ContextFilters,
    ) -> Result<Vec<Context>> {
        let mut contexts: Vec<Context> = self
            .records()
            .contexts
            .values()
            .filter(|context| context.user_id == user_id && filters.matches(context))
            .cloned()
            .collect();
        contexts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(contexts)
    }

    fn subscribe(&self, collection: Collection) -> broadcast::Receiver<ChangeEvent> {
        match collection {
            Collection::Chats => self.chat_events.subscribe(),
            Collection::Messages => self.message_events.subscribe(),
            Collection::Contexts => self.context_events.subscribe(),
        }
    }
}
