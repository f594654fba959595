//! Feed item types.

use serde::{Deserialize, Serialize};

/// A feed post as exchanged with the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_avatar: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation time in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, alias = "likes")]
    pub likes_count: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    /// Display label such as "2h ago".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neural_score: Option<f64>,
}

impl Post {
    /// Line fed to the summary prompt.
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.author_name, self.content)
    }
}

/// Content the viewer has chosen not to see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HiddenContent {
    pub reported_post_ids: Vec<String>,
    pub muted_user_ids: Vec<String>,
    pub blocked_user_ids: Vec<String>,
}

impl HiddenContent {
    pub fn hides(&self, post: &Post) -> bool {
        self.reported_post_ids.iter().any(|id| *id == post.id)
            || self.muted_user_ids.iter().any(|id| *id == post.user_id)
            || self.blocked_user_ids.iter().any(|id| *id == post.user_id)
    }
}
