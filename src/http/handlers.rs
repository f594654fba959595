//! Public API handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::feed::{HiddenContent, Post};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::provider::ChatTurn;
use crate::stories::{StoryAuthor, StoryDraft, StoryEntry};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub source: &'static str,
}

pub async fn summary(
    State(state): State<AppState>,
    Json(body): Json<SummaryRequest>,
) -> Json<SummaryResponse> {
    let served = state.gateway.summarize_feed(&body.posts).await;
    Json(SummaryResponse {
        source: served.source.label(),
        summary: served.into_data(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseRequest {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub following_ids: Vec<String>,
    #[serde(default)]
    pub hidden: HiddenContent,
}

#[derive(Debug, Serialize)]
pub struct PulseResponse {
    pub posts: Vec<Post>,
    pub summary: String,
    pub source: &'static str,
}

pub async fn pulse(
    State(state): State<AppState>,
    Json(body): Json<PulseRequest>,
) -> Json<PulseResponse> {
    let pulse = state
        .gateway
        .pulse(body.posts, &body.following_ids, &body.hidden)
        .await;
    Json(PulseResponse {
        posts: pulse.ranked,
        source: pulse.summary.source.label(),
        summary: pulse.summary.into_data(),
    })
}

#[derive(Debug, Serialize)]
pub struct EchoesResponse {
    pub posts: Vec<Post>,
    pub source: &'static str,
}

pub async fn echoes(State(state): State<AppState>) -> Json<EchoesResponse> {
    let served = state.gateway.global_echoes().await;
    Json(EchoesResponse {
        source: served.source.label(),
        posts: served.into_data(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub conversation_id: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// `None` when a newer message in the same conversation superseded this one.
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if body.history.is_empty() {
        return Err(ApiError::BadRequest("history must not be empty".into()));
    }

    let reply = state
        .gateway
        .chat_reply_in(&body.conversation_id, &body.history)
        .await;

    Ok(Json(match reply {
        Some(served) => ChatResponse {
            source: Some(served.source.label()),
            reply: Some(served.into_data()),
        },
        None => ChatResponse {
            reply: None,
            source: None,
        },
    }))
}

/// Close a conversation; replies still pending for it are dropped.
pub async fn end_chat(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> StatusCode {
    state.gateway.end_scope(&conversation_id);
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image: Option<String>,
    pub source: &'static str,
}

pub async fn image(
    State(state): State<AppState>,
    Json(body): Json<ImageRequest>,
) -> Json<ImageResponse> {
    let served = state.gateway.generate_image(&body.prompt).await;
    Json(ImageResponse {
        source: served.source.label(),
        image: served.into_data(),
    })
}

pub async fn list_stories(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Json<Vec<StoryEntry>> {
    Json(state.stories.load_active(&owner))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStoriesRequest {
    #[serde(flatten)]
    pub author: StoryAuthor,
    pub drafts: Vec<StoryDraft>,
}

pub async fn post_stories(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    Json(body): Json<PostStoriesRequest>,
) -> Result<(StatusCode, Json<Vec<StoryEntry>>), ApiError> {
    let created = state
        .stories
        .append_batch(&owner, &body.author, body.drafts)?;
    tracing::debug!(owner = %owner, created = created.len(), "Stories posted");
    Ok((StatusCode::CREATED, Json(created)))
}
