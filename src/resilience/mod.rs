//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the generative service:
//!     → circuit_breaker.rs (reject immediately while locked out)
//!     → retries.rs (attempt, classify, back off on rate limiting)
//!     → backoff.rs (3000ms * 2^attempt + jitter)
//!     → on exhaustion: circuit_breaker.rs trip(45s)
//! ```
//!
//! # Design Decisions
//! - Fail fast while open; no network I/O is spent during a cooldown
//! - Only rate limiting is retried
//! - Timing constants come from config and are shared by every call site

pub mod backoff;
pub mod circuit_breaker;
pub mod retries;

pub use circuit_breaker::CircuitBreaker;
pub use retries::{is_rate_limit, RetryingInvoker};
