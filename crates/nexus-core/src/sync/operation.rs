//! Buffered mutation model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Chat, ChatId, ChatPatch, Collection, Context, ContextId, ContextPatch, Message, MessageId,
    MessageStatus,
};

/// A unique identifier for a queued operation, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Create a new unique operation ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Broad mutation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A single buffered mutation, one variant per (kind, collection) pair.
///
/// Each variant carries its precisely typed payload, so replay dispatch
/// never needs to inspect an opaque blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    CreateChat { chat: Chat },
    UpdateChat { id: ChatId, patch: ChatPatch },
    DeleteChat { id: ChatId },
    CreateMessage { message: Message },
    UpdateMessageStatus { id: MessageId, status: MessageStatus },
    DeleteMessage { id: MessageId },
    CreateContext { context: Context },
    UpdateContext { id: ContextId, patch: ContextPatch },
    DeleteContext { id: ContextId },
}

impl Operation {
    /// The remote collection this mutation targets
    #[must_use]
    pub const fn collection(&self) -> Collection {
        match self {
            Self::CreateChat { .. } | Self::UpdateChat { .. } | Self::DeleteChat { .. } => {
                Collection::Chats
            }
            Self::CreateMessage { .. }
            | Self::UpdateMessageStatus { .. }
            | Self::DeleteMessage { .. } => Collection::Messages,
            Self::CreateContext { .. }
            | Self::UpdateContext { .. }
            | Self::DeleteContext { .. } => Collection::Contexts,
        }
    }

    /// The broad mutation category
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::CreateChat { .. } | Self::CreateMessage { .. } | Self::CreateContext { .. } => {
                OperationKind::Create
            }
            Self::UpdateChat { .. }
            | Self::UpdateMessageStatus { .. }
            | Self::UpdateContext { .. } => OperationKind::Update,
            Self::DeleteChat { .. } | Self::DeleteMessage { .. } | Self::DeleteContext { .. } => {
                OperationKind::Delete
            }
        }
    }
}

/// A pending mutation awaiting remote application.
///
/// Created by `enqueue`, mutated only by the executor (retry increments),
/// destroyed on successful replay or when the retry ceiling is exceeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOperation {
    /// Unique identifier, assigned at enqueue time
    pub id: OperationId,
    /// The buffered mutation
    pub op: Operation,
    /// Enqueue timestamp (Unix ms)
    pub enqueued_at: i64,
    /// Failed replay attempts so far
    pub retries: u32,
}

impl SyncOperation {
    /// Wrap a mutation for queueing, stamping id and enqueue time.
    #[must_use]
    pub fn new(op: Operation) -> Self {
        Self {
            id: OperationId::new(),
            op,
            enqueued_at: chrono::Utc::now().timestamp_millis(),
            retries: 0,
        }
    }
}
