//! Shared utilities for integration tests.
#![allow(dead_code)]

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use nexus_gateway::provider::ScriptedProvider;

/// Gemini-shaped success body carrying `text`.
pub fn gemini_text(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] })
}

/// Gemini-shaped success body carrying one inline image.
pub fn gemini_image(mime: &str, data: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "inlineData": { "mimeType": mime, "data": data } }] } }] })
}

/// Gemini-shaped quota error.
pub fn gemini_quota_error() -> (u16, Value) {
    (
        429,
        json!({ "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" } }),
    )
}

/// Start a programmable mock of the generative service on an ephemeral port.
/// `f` receives the request path and JSON body and returns status and body.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(String, Value) -> (u16, Value) + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let app = Router::new().fallback(move |uri: axum::http::Uri, Json(body): Json<Value>| {
        let f = f.clone();
        async move {
            let (status, body) = f(uri.path().to_string(), body);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            (status, Json(body)).into_response()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A bare post as the web client sends it.
pub fn post(id: &str, author: &str, content: &str) -> Value {
    json!({ "id": id, "userId": author, "authorName": author, "content": content, "likes": 0 })
}
