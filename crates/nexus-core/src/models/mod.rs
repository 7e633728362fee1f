//! Data models for Nexus

mod chat;
mod collection;
mod context;
mod message;

pub use chat::{Chat, ChatId, ChatPatch};
pub use collection::Collection;
pub use context::{Context, ContextCategory, ContextFilters, ContextId, ContextPatch};
pub use message::{Message, MessageId, MessageRole, MessageStatus};
