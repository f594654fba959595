//! Generative content provider subsystem.
//!
//! # Data Flow
//! ```text
//! gateway feature (summary, echoes, chat, image)
//!     → GenerationRequest (model, contents, output shape)
//!     → GenerativeProvider::generate
//!         └─ gemini.rs (REST generateContent over reqwest)
//!     → GenerationResponse (text and/or inline image data)
//! ```
//!
//! # Design Decisions
//! - Responses are treated as opaque; only rate-limit errors are classified (in resilience)
//! - The provider never retries on its own; retry policy lives in the gateway
//! - Errors keep status, code and message so classification does not parse prose

pub mod gemini;
pub mod scripted;
pub mod types;

use std::future::Future;

pub use gemini::GeminiProvider;
pub use scripted::ScriptedProvider;
pub use types::{
    ChatTurn, GenerationRequest, GenerationResponse, InlineData, ProviderError, Role,
};

/// A remote generative-content service.
pub trait GenerativeProvider: Send + Sync + 'static {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = Result<GenerationResponse, ProviderError>> + Send;
}
