//! Document store seam
//!
//! The sync engine talks to the hosted backend exclusively through
//! [`DocumentStore`]. Production builds wire in a client for the hosted
//! document database; tests and local tooling use [`InMemoryStore`].

mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::models::{
    Chat, ChatId, ChatPatch, Collection, Context, ContextFilters, ContextId, ContextPatch,
    Message, MessageId, MessageStatus,
};

pub use memory::InMemoryStore;

/// What happened to a record, as pushed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// Push notification for a single record change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    /// String form of the changed record's id
    pub record_id: String,
}

/// Async interface to the remote document store.
///
/// Create calls take records with client-generated ids so that records
/// created offline keep a stable identity once replayed.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Chats
    async fn create_chat(&self, chat: &Chat) -> Result<Chat>;
    async fn update_chat(&self, id: &ChatId, patch: ChatPatch) -> Result<Chat>;
    /// Delete a chat and every message in it.
    async fn delete_chat(&self, id: &ChatId) -> Result<()>;
    async fn list_chats(&self, user_id: &str, archived: bool) -> Result<Vec<Chat>>;

    // Messages
    async fn create_message(&self, message: &Message) -> Result<Message>;
    async fn update_message_status(
        &self,
        id: &MessageId,
        status: MessageStatus,
    ) -> Result<Message>;
    async fn delete_message(&self, id: &MessageId) -> Result<()>;
    async fn list_messages(
        &self,
        chat_id: &ChatId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>>;

    // Contexts
    async fn create_context(&self, context: &Context) -> Result<Context>;
    async fn update_context(&self, id: &ContextId, patch: ContextPatch) -> Result<Context>;
    async fn delete_context(&self, id: &ContextId) -> Result<()>;
    async fn list_contexts(&self, user_id: &str, filters: ContextFilters)
        -> Result<Vec<Context>>;

    /// Subscribe to change pushes for one collection. The transport is a
    /// black box; dropping the receiver unsubscribes.
    fn subscribe(&self, collection: Collection) -> broadcast::Receiver<ChangeEvent>;
}
