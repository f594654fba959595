//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, path from NEXUS_GATEWAY_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → sections handed to the subsystems that own them
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets (provider API key) are read from the environment, never from the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{
    AdminConfig, CacheConfig, GatewayConfig, ListenerConfig, ObservabilityConfig,
    ProviderConfig, ResilienceConfig, StorageConfig, StoryConfig, TimeoutConfig,
};
