//! Uncached assistant features: chat replies and image generation.

use crate::gateway::types::{Served, ServedFrom};
use crate::gateway::{degraded_for, Gateway};
use crate::observability::metrics;
use crate::provider::{ChatTurn, GenerationRequest, GenerativeProvider};

pub const CHAT_FALLBACK: &str = "Local node synchronization optimal. Transmit again in a moment.";
pub const CHAT_EMPTY_REPLY: &str = "Frequencies aligned.";

const CHAT_FEATURE: &str = "chat";
const IMAGE_FEATURE: &str = "image";
const IMAGE_ASPECT_RATIO: &str = "1:1";

fn image_prompt(prompt: &str) -> String {
    format!(
        "Social media ready artistic digital render: {}. Kinetic aura aesthetics.",
        prompt
    )
}

impl<P: GenerativeProvider> Gateway<P> {
    /// Assistant reply to a conversation. Never fails.
    pub async fn chat_reply(&self, history: &[ChatTurn]) -> Served<String> {
        let request = GenerationRequest {
            model: self.provider_config.text_model.clone(),
            contents: history.to_vec(),
            system_instruction: Some(self.provider_config.chat_instruction.clone()),
            response_mime_type: None,
            image_aspect_ratio: None,
        };

        let served = match self.call(CHAT_FEATURE, self.policy().chat_max_retries, request).await {
            Ok(response) => {
                let text = response.text.filter(|t| !t.is_empty());
                Served::new(
                    text.unwrap_or_else(|| CHAT_EMPTY_REPLY.to_string()),
                    ServedFrom::Remote,
                )
            }
            Err(e) => {
                tracing::debug!(error = %e, "Chat call failed, using fallback reply");
                Served::new(CHAT_FALLBACK.to_string(), ServedFrom::Fallback(degraded_for(e)))
            }
        };
        metrics::record_served(CHAT_FEATURE, served.source.label());
        served
    }

    /// Like [`chat_reply`](Self::chat_reply), but returns `None` when a newer
    /// request in `scope` started (or the scope ended) while this one ran.
    pub async fn chat_reply_in(&self, scope: &str, history: &[ChatTurn]) -> Option<Served<String>> {
        let generation = self.generations.begin(scope);
        let reply = self.chat_reply(history).await;

        if self.generations.finish(&generation) {
            Some(reply)
        } else {
            tracing::debug!(scope, "Discarding superseded chat reply");
            None
        }
    }

    /// Forget a conversation scope; replies still in flight are discarded.
    pub fn end_scope(&self, scope: &str) {
        self.generations.end_scope(scope);
    }

    /// Square image for `prompt` as a data URL, or `None`. Never fails.
    pub async fn generate_image(&self, prompt: &str) -> Served<Option<String>> {
        if prompt.trim().is_empty() {
            metrics::record_served(IMAGE_FEATURE, ServedFrom::Placeholder.label());
            return Served::new(None, ServedFrom::Placeholder);
        }

        let request = GenerationRequest::prompt(&self.provider_config.image_model, image_prompt(prompt))
            .with_image_aspect_ratio(IMAGE_ASPECT_RATIO);

        let served = match self.call(IMAGE_FEATURE, self.policy().image_max_retries, request).await {
            Ok(response) => Served::new(
                response.inline_data.first().map(|d| d.to_data_url()),
                ServedFrom::Remote,
            ),
            Err(e) => {
                tracing::debug!(error = %e, "Image generation failed");
                Served::new(None, ServedFrom::Fallback(degraded_for(e)))
            }
        };
        metrics::record_served(IMAGE_FEATURE, served.source.label());
        served
    }
}
