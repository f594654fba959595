//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID set/propagated, request span)
//!     → middleware/metrics.rs (route, status, latency)
//!     → handlers.rs (public API) or admin (bearer-protected status)
//!     → gateway / stories
//!     → response.rs (input and storage errors as JSON)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
