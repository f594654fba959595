//! Global echoes: a few short AI-written posts mixed into the feed.

use serde::Deserialize;

use crate::feed::Post;
use crate::gateway::types::{FeatureKey, GatewayError, Served};
use crate::gateway::Gateway;
use crate::provider::{GenerationRequest, GenerationResponse, GenerativeProvider};

const ECHOES_PROMPT: &str = "Return 3 short social posts as JSON. Keys: id, authorName, content, likes.";
const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";
const ECHO_TIMESTAMP: &str = "Global Frequency";

/// Post shape the model is asked to produce.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEcho {
    id: serde_json::Value,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    likes: serde_json::Value,
}

/// Like count from whatever the model wrote: integers, floats or numeric strings.
fn likes_from(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_or(0, |f| f.max(0.0) as u64),
        _ => 0,
    }
}

fn avatar_for(seed: &str) -> String {
    format!("{}{}", AVATAR_BASE, seed.replace(' ', "%20"))
}

impl RawEcho {
    fn into_post(self) -> Post {
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let global_id = format!("global-{}", id);

        Post {
            id: global_id.clone(),
            user_id: global_id,
            author_avatar: avatar_for(&self.author_name),
            author_name: self.author_name,
            content: self.content,
            image_url: None,
            created_at: None,
            likes_count: likes_from(&self.likes),
            comments: 0,
            shares: fastrand::u64(0..5),
            timestamp: Some(ECHO_TIMESTAMP.to_string()),
            neural_score: None,
        }
    }
}

/// Parse the model's JSON array into feed posts.
pub fn parse_echoes(response: GenerationResponse) -> Result<Vec<Post>, GatewayError> {
    let text = response.text.unwrap_or_default();
    let text = if text.trim().is_empty() { "[]" } else { text.trim() };
    let raw: Vec<RawEcho> = serde_json::from_str(text)
        .map_err(|e| GatewayError::MalformedResponse(format!("echoes: {}", e)))?;
    Ok(raw.into_iter().map(RawEcho::into_post).collect())
}

/// The single system post shown when echoes are unavailable.
pub fn fallback_echoes() -> Vec<Post> {
    vec![Post {
        id: "fallback-1".to_string(),
        user_id: "nexus-ai".to_string(),
        author_name: "Nexus Protocol".to_string(),
        author_avatar: avatar_for("NexusAI"),
        content: "All systems are resonating within expected parameters. Stay synchronized. ✨"
            .to_string(),
        image_url: None,
        created_at: None,
        likes_count: 42,
        comments: 0,
        shares: 5,
        timestamp: Some("System Echo".to_string()),
        neural_score: None,
    }]
}

impl<P: GenerativeProvider> Gateway<P> {
    /// A handful of global posts. Never fails.
    pub async fn global_echoes(&self) -> Served<Vec<Post>> {
        let request = GenerationRequest::prompt(&self.provider_config.text_model, ECHOES_PROMPT)
            .with_response_mime_type("application/json");

        self.fetch_cached(
            FeatureKey::GlobalEchoes,
            None,
            request,
            parse_echoes,
            fallback_echoes,
            fallback_echoes,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::GatewayConfig;
    use crate::gateway::types::{Degraded, ServedFrom};
    use crate::provider::scripted::ScriptedProvider;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    const ECHO_JSON: &str = r#"[
        {"id": 1, "authorName": "Lumen Drift", "content": "night city hums", "likes": 12},
        {"id": "b", "authorName": "Vox", "content": "signal found", "likes": 3}
    ]"#;

    fn gateway(provider: ScriptedProvider) -> (Gateway<ScriptedProvider>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(50_000_000));
        let gateway = Gateway::new(
            provider,
            Arc::new(MemoryStore::new()),
            clock.clone(),
            &GatewayConfig::default(),
        );
        (gateway, clock)
    }

    #[test]
    fn test_parse_normalizes_posts() {
        let posts = parse_echoes(GenerationResponse::text(ECHO_JSON)).unwrap();
        assert_eq!(posts.len(), 2);

        let first = &posts[0];
        assert_eq!(first.id, "global-1");
        assert_eq!(first.user_id, "global-1");
        assert_eq!(first.likes_count, 12);
        assert_eq!(first.comments, 0);
        assert!(first.shares < 5);
        assert_eq!(first.timestamp.as_deref(), Some("Global Frequency"));
        assert_eq!(
            first.author_avatar,
            "https://api.dicebear.com/7.x/avataaars/svg?seed=Lumen%20Drift"
        );
        assert_eq!(posts[1].id, "global-b");
    }

    #[test]
    fn test_parse_tolerates_odd_like_counts() {
        let text = r#"[
            {"id": 1, "authorName": "A", "content": "x", "likes": 12.0},
            {"id": 2, "authorName": "B", "content": "y", "likes": "7"},
            {"id": 3, "authorName": "C", "content": "z", "likes": null},
            {"id": 4, "authorName": "D", "content": "w", "likes": -3},
            {"id": 5, "authorName": "E", "content": "v"}
        ]"#;
        let posts = parse_echoes(GenerationResponse::text(text)).unwrap();
        let likes: Vec<u64> = posts.iter().map(|p| p.likes_count).collect();
        assert_eq!(likes, vec![12, 7, 0, 0, 0]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_echoes(GenerationResponse::text("here are posts!")).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
        assert!(parse_echoes(GenerationResponse::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requests_json_and_caches() {
        let provider = ScriptedProvider::new().then(Ok(GenerationResponse::text(ECHO_JSON)));
        let (gateway, clock) = gateway(provider);

        let first = gateway.global_echoes().await;
        assert!(first.is_remote());
        let request = gateway.provider().requests().remove(0);
        assert_eq!(request.response_mime_type.as_deref(), Some("application/json"));

        clock.advance(Duration::from_secs(59 * 60));
        let second = gateway.global_echoes().await;
        assert!(matches!(second.source, ServedFrom::Cache));
        assert_eq!(second.data, first.data);
        assert_eq!(gateway.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_serves_fallback() {
        let provider = ScriptedProvider::new().then(Ok(GenerationResponse::text("{oops")));
        let (gateway, _) = gateway(provider);

        let served = gateway.global_echoes().await;
        assert_eq!(served.data, fallback_echoes());
        assert!(matches!(
            served.source,
            ServedFrom::Fallback(Degraded::Failed(GatewayError::MalformedResponse(_)))
        ));
        assert!(gateway.cache().get::<Vec<Post>>(FeatureKey::GlobalEchoes).is_none());
    }
}
