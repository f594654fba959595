//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the gateway service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry and circuit breaker policy for generative calls.
    pub resilience: ResilienceConfig,

    /// TTLs for AI-derived content.
    pub cache: CacheConfig,

    /// Ephemeral story settings.
    pub stories: StoryConfig,

    /// Generative content provider.
    pub provider: ProviderConfig,

    /// Persistent key-value storage.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes (story drafts carry inline images).
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Retry and lockout policy shared by every generative call site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound (exclusive) of the uniform jitter added to each delay.
    pub jitter_ms: u64,

    /// How long the circuit stays open once retries are exhausted.
    pub lockout_ms: u64,

    /// Retries for call sites without a specific budget.
    pub default_max_retries: u32,

    /// Retries for chat replies.
    pub chat_max_retries: u32,

    /// Retries for image generation.
    pub image_max_retries: u32,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 3_000,
            jitter_ms: 1_000,
            lockout_ms: 45_000,
            default_max_retries: 2,
            chat_max_retries: 2,
            image_max_retries: 0,
        }
    }
}

impl ResilienceConfig {
    pub fn lockout(&self) -> Duration {
        Duration::from_millis(self.lockout_ms)
    }
}

/// TTL configuration for the feature caches.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Feed summary TTL in milliseconds.
    pub summary_ttl_ms: u64,

    /// Global echoes TTL in milliseconds.
    pub echoes_ttl_ms: u64,

    /// An unchanged input hash keeps the summary fresh past its TTL.
    pub summary_hash_overrides_ttl: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            summary_ttl_ms: 30 * 60 * 1000,
            echoes_ttl_ms: 60 * 60 * 1000,
            summary_hash_overrides_ttl: true,
        }
    }
}

/// Story store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Lifetime of a story in milliseconds.
    pub ttl_ms: u64,

    /// Maximum live stories per owner.
    pub max_total: usize,

    /// Playback duration of a single story in milliseconds.
    pub display_duration_ms: u64,

    /// Playback progress tick in milliseconds.
    pub tick_ms: u64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 24 * 60 * 60 * 1000,
            max_total: 20,
            display_duration_ms: 5_000,
            tick_ms: 50,
        }
    }
}

/// Generative content provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// REST endpoint root.
    pub base_url: String,

    /// Environment variable holding the API key. The key itself never lives in config.
    pub api_key_env: String,

    /// Model used for text generation (summary, echoes, chat).
    pub text_model: String,

    /// Model used for image generation.
    pub image_model: String,

    /// System instruction for chat replies.
    pub chat_instruction: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            text_model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            chat_instruction: "You are Nexus AI. Witty, helpful, and concise (max 2 sentences). \
                               Use a technical/futuristic tone."
                .to_string(),
            request_timeout_secs: 20,
        }
    }
}

/// Key-value storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the store. In-memory only when unset.
    pub path: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}
