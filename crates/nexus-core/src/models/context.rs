//! Context model
//!
//! A context is a reusable piece of reference material (a document, a code
//! snippet, a saved chat) that users attach to conversations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for a context, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Create a new unique context ID using UUID v7
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

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContextId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Kind of reference material a context holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextCategory {
    Knowledge,
    Document,
    Chat,
    Code,
    Custom,
}

/// A reusable context entry in the user's library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier
    pub id: ContextId,
    /// Owning user
    pub user_id: String,
    /// Display title
    pub title: String,
    /// Body text
    pub content: String,
    /// Category
    pub category: ContextCategory,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Times this context was attached to a chat
    pub usage_count: u32,
    /// Last attachment timestamp (Unix ms)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
    /// Opaque metadata blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    /// Pinned by the user
    pub is_favorite: bool,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Context {
    /// Create a new context entry
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        category: ContextCategory,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: ContextId::new(),
            user_id: user_id.into(),
            title: title.into(),
            content: content.into(),
            category,
            tags: Vec::new(),
            usage_count: 0,
            last_used_at: None,
            metadata: None,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at`.
    pub fn apply(&mut self, patch: ContextPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(usage_count) = patch.usage_count {
            self.usage_count = usage_count;
        }
        if let Some(last_used_at) = patch.last_used_at {
            self.last_used_at = Some(last_used_at);
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = Some(metadata);
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    /// Record one more attachment of this context to a chat.
    #[must_use]
    pub fn usage_patch(&self) -> ContextPatch {
        ContextPatch {
            usage_count: Some(self.usage_count + 1),
            last_used_at: Some(chrono::Utc::now().timestamp_millis()),
            ..ContextPatch::default()
        }
    }
}

/// Partial update to a context; unset fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ContextCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

/// Filters for listing the context library
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextFilters {
    pub category: Option<ContextCategory>,
    pub is_favorite: Option<bool>,
    pub search: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ContextFilters {
    /// Whether a context passes this filter set.
    #[must_use]
    pub fn matches(&self, context: &Context) -> bool {
        if let Some(category) = self.category {
            if context.category != category {
                return false;
            }
        }
        if let Some(is_favorite) = self.is_favorite {
            if context.is_favorite != is_favorite {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !context
                .title
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.iter().all(|tag| context.tags.contains(tag)) {
                return false;
            }
        }
        true
    }
}
