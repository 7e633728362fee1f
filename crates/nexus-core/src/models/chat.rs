//! Chat model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::ContextId;

/// A unique identifier for a chat, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(Uuid);

impl ChatId {
    /// Create a new unique chat ID using UUID v7
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

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A conversation thread owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier
    pub id: ChatId,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Preview of the most recent message, truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    /// Timestamp of the most recent message (Unix ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<i64>,
    /// Hidden from the main chat list
    pub archived: bool,
    /// Contexts attached to this chat
    #[serde(default)]
    pub context_ids: Vec<ContextId>,
    /// Number of messages in the thread
    pub message_count: u32,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Chat {
    /// Create a new chat for the given user
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        context_ids: Vec<ContextId>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: ChatId::new(),
            user_id: user_id.into(),
            name: name.into(),
            last_message: None,
            last_message_at: None,
            archived: false,
            context_ids,
            message_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at`.
    pub fn apply(&mut self, patch: ChatPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(last_message) = patch.last_message {
            self.last_message = Some(last_message);
        }
        if let Some(last_message_at) = patch.last_message_at {
            self.last_message_at = Some(last_message_at);
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        if let Some(context_ids) = patch.context_ids {
            self.context_ids = context_ids;
        }
        if let Some(message_count) = patch.message_count {
            self.message_count = message_count;
        }
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Partial update to a chat; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_ids: Option<Vec<ContextId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u32>,
}
