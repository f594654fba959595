//! Request, response and error types for generative calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of a chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A provider-agnostic generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub contents: Vec<ChatTurn>,
    pub system_instruction: Option<String>,
    /// Desired output MIME type, e.g. `application/json`.
    pub response_mime_type: Option<String>,
    /// Aspect ratio for image output, e.g. `1:1`.
    pub image_aspect_ratio: Option<String>,
}

impl GenerationRequest {
    /// Single user prompt against `model`.
    pub fn prompt(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![ChatTurn::user(text)],
            system_instruction: None,
            response_mime_type: None,
            image_aspect_ratio: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_response_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.response_mime_type = Some(mime.into());
        self
    }

    pub fn with_image_aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.image_aspect_ratio = Some(ratio.into());
        self
    }
}

/// Binary payload returned inline (images).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 encoded bytes, as delivered by the provider.
    pub data: String,
}

impl InlineData {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// What came back from one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    pub text: Option<String>,
    pub inline_data: Vec<InlineData>,
}

impl GenerationResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: Vec::new(),
        }
    }
}

/// Failure reported by (or while reaching) the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error (status {status:?}, code {code:?}): {message}")]
pub struct ProviderError {
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Provider-level error code from the response body.
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            code: None,
            message: message.into(),
        }
    }

    /// A canned rate-limit response.
    pub fn rate_limited() -> Self {
        Self {
            status: Some(429),
            code: Some(429),
            message: "RESOURCE_EXHAUSTED: quota exceeded".to_string(),
        }
    }
}
