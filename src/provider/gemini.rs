//! Gemini REST client.
//!
//! # Responsibilities
//! - Translate `GenerationRequest` into a `generateContent` call
//! - Extract text and inline image parts from the first candidate
//! - Preserve HTTP status and error body fields for classification

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::provider::types::{
    ChatTurn, GenerationRequest, GenerationResponse, InlineData, ProviderError, Role,
};
use crate::provider::GenerativeProvider;

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiProvider {
    /// Build a client from config, reading the API key from the configured environment variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ProviderError::new(format!("environment variable {} is not set", config.api_key_env))
        })?;
        Self::new(config, api_key)
    }

    pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::new(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn send(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = self.endpoint(&request.model);
        let body = WireRequest::from(&request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError {
                status: e.status().map(|s| s.as_u16()),
                code: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &text));
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::with_status(status.as_u16(), format!("malformed response: {}", e)))?;

        Ok(wire.into_response())
    }
}

impl GenerativeProvider for GeminiProvider {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse, ProviderError>> + Send {
        tracing::debug!(model = %request.model, turns = request.contents.len(), "Calling generative provider");
        self.send(request)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn error_from_body(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<WireErrorEnvelope>(body) {
        Ok(envelope) => ProviderError {
            status: Some(status),
            code: envelope.error.code,
            message: match envelope.error.status {
                Some(s) => format!("{}: {}", s, envelope.error.message),
                None => envelope.error.message,
            },
        },
        Err(_) => ProviderError::with_status(status, body.chars().take(200).collect::<String>()),
    }
}

// ===== Wire format =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

impl From<&GenerationRequest> for WireRequest {
    fn from(request: &GenerationRequest) -> Self {
        let generation_config =
            if request.response_mime_type.is_some() || request.image_aspect_ratio.is_some() {
                Some(WireGenerationConfig {
                    response_mime_type: request.response_mime_type.clone(),
                    image_config: request
                        .image_aspect_ratio
                        .clone()
                        .map(|aspect_ratio| WireImageConfig { aspect_ratio }),
                })
            } else {
                None
            };

        Self {
            contents: request.contents.iter().map(WireContent::from).collect(),
            system_instruction: request.system_instruction.as_ref().map(|text| WireContent {
                role: None,
                parts: vec![WirePart::text(text)],
            }),
            generation_config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

impl From<&ChatTurn> for WireContent {
    fn from(turn: &ChatTurn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![WirePart::text(&turn.text)],
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<WireInlineData>,
}

impl WirePart {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<WireImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireContent>,
}

impl WireResponse {
    fn into_response(self) -> GenerationResponse {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default();

        let mut text: Option<String> = None;
        let mut inline_data = Vec::new();
        for part in parts {
            if let Some(t) = part.text {
                text.get_or_insert_with(String::new).push_str(&t);
            }
            if let Some(d) = part.inline_data {
                inline_data.push(InlineData {
                    mime_type: d.mime_type,
                    data: d.data,
                });
            }
        }

        GenerationResponse { text, inline_data }
    }
}

#[derive(Debug, Deserialize)]
struct WireErrorEnvelope {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    code: Option<i64>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}
