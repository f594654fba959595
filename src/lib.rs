//! Nexus gateway: resilient access to a generative AI service for a social
//! feed, plus ephemeral stories.

pub mod admin;
pub mod clock;
pub mod config;
pub mod feed;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provider;
pub mod resilience;
pub mod storage;
pub mod stories;

pub use config::schema::GatewayConfig;
pub use gateway::{Gateway, Served, ServedFrom};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
