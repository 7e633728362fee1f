//! Message model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chat::ChatId;
use super::context::ContextId;

/// A unique identifier for a message, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Create a new unique message ID using UUID v7
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

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Author role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Delivery state of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Sent,
    Delivered,
    Read,
    Failed,
}

/// A single message inside a chat thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier
    pub id: MessageId,
    /// Thread this message belongs to
    pub chat_id: ChatId,
    /// Owning user
    pub user_id: String,
    /// Message body
    pub content: String,
    /// Author role
    pub role: MessageRole,
    /// Delivery state
    pub status: MessageStatus,
    /// Assistant reasoning trace, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Attached file identifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    /// Contexts referenced by this message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_ids: Vec<ContextId>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
}

impl Message {
    /// Create a new outgoing message in `Sending` state
    #[must_use]
    pub fn new(
        chat_id: ChatId,
        user_id: impl Into<String>,
        content: impl Into<String>,
        role: MessageRole,
    ) -> Self {
        Self {
            id: MessageId::new(),
            chat_id,
            user_id: user_id.into(),
            content: content.into(),
            role,
            status: MessageStatus::Sending,
            thinking: None,
            attachments: Vec::new(),
            context_ids: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Preview of the message body, truncated to `max_chars` characters
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        self.content.chars().take(max_chars).collect()
    }
}
