//! API error responses.
//!
//! # Design Decisions
//! - Gateway features never fail, so only input and storage errors surface
//! - Bodies are `{"error": "..."}`; storage details stay in the logs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::stories::StoryError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal,
}

impl From<StoryError> for ApiError {
    fn from(error: StoryError) -> Self {
        match error {
            StoryError::Storage(e) => {
                tracing::warn!(error = %e, "Story write failed");
                ApiError::Internal
            }
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_errors_map_to_status() {
        let response = ApiError::from(StoryError::NothingToPost).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let response = ApiError::from(StoryError::Storage(io.into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
