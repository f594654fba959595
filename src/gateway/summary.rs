//! Feed summary ("pulse") feature.

use crate::feed::{rank_feed, HiddenContent, Post};
use crate::gateway::cache::content_hash;
use crate::gateway::types::{FeatureKey, Served, ServedFrom};
use crate::gateway::Gateway;
use crate::observability::metrics;
use crate::provider::{GenerationRequest, GenerativeProvider};

pub const VOID_PLACEHOLDER: &str = "The void is quiet. Waiting for transmissions...";
pub const PULSE_STEADY: &str = "The Pulse is steady. Frequencies are aligning across the cluster.";
pub const AURA_FLUCTUATING: &str = "Aura is currently fluctuating. Visual sync recommended.";

const SUMMARY_PROMPT: &str = "Summarize this feed in 3 very short atmospheric bullet points. Data:\n";

/// Number of top-ranked posts that feed the pulse summary.
pub const PULSE_WINDOW: usize = 5;

/// Ranked feed plus the summary of its head.
#[derive(Debug, Clone)]
pub struct Pulse {
    pub ranked: Vec<Post>,
    pub summary: Served<String>,
}

fn steady() -> String {
    PULSE_STEADY.to_string()
}

fn fluctuating() -> String {
    AURA_FLUCTUATING.to_string()
}

impl<P: GenerativeProvider> Gateway<P> {
    /// Short atmospheric summary of `posts`. Never fails.
    pub async fn summarize_feed(&self, posts: &[Post]) -> Served<String> {
        if posts.is_empty() {
            metrics::record_served(FeatureKey::FeedSummary.as_str(), ServedFrom::Placeholder.label());
            return Served::new(VOID_PLACEHOLDER.to_string(), ServedFrom::Placeholder);
        }

        let hash = content_hash(posts.iter().map(|p| p.id.as_str()));
        let lines: Vec<String> = posts.iter().map(Post::summary_line).collect();
        let request = GenerationRequest::prompt(
            &self.provider_config.text_model,
            format!("{}{}", SUMMARY_PROMPT, lines.join("\n")),
        );

        self.fetch_cached(
            FeatureKey::FeedSummary,
            Some(hash),
            request,
            |response| Ok(response.text.unwrap_or_default()),
            steady,
            fluctuating,
        )
        .await
    }

    /// Rank the feed for a viewer and summarize its top posts.
    pub async fn pulse(
        &self,
        posts: Vec<Post>,
        following_ids: &[String],
        hidden: &HiddenContent,
    ) -> Pulse {
        let ranked = rank_feed(posts, following_ids, hidden, self.now_ms());
        let head = &ranked[..ranked.len().min(PULSE_WINDOW)];
        let summary = self.summarize_feed(head).await;
        Pulse { ranked, summary }
    }
}
