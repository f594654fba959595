//! Story types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StorageError;

/// A persisted story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryEntry {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Creation time in epoch milliseconds, shared by a batch.
    #[serde(alias = "timestamp")]
    pub created_at: u64,
    /// Position within the batch.
    #[serde(default)]
    pub rank: u32,
    #[serde(default = "default_display_duration", alias = "duration")]
    pub display_duration_ms: u64,
}

fn default_display_duration() -> u64 {
    5000
}

impl StoryEntry {
    pub fn order_key(&self) -> (u64, u32) {
        (self.created_at, self.rank)
    }
}

/// A story being composed, not yet persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDraft {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl StoryDraft {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none()
    }
}

/// Who is posting a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryAuthor {
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: String,
}

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("owner id must not be empty")]
    EmptyOwner,

    #[error("author name must not be empty")]
    EmptyAuthor,

    #[error("no story content to post")]
    NothingToPost,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
