use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;

/// Whether an `Authorization` header value carries `key` as a bearer token.
pub fn bearer_matches(header: Option<&str>, key: &str) -> bool {
    match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => !key.is_empty() && token.trim() == key,
        None => false,
    }
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if bearer_matches(auth_header, &state.config.admin.api_key) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(path = %request.uri().path(), "Rejected admin request");
    Err(StatusCode::UNAUTHORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_matches() {
        let key = "a-very-long-admin-key";
        assert!(bearer_matches(Some("Bearer a-very-long-admin-key"), key));
        assert!(!bearer_matches(Some("Bearer wrong"), key));
        assert!(!bearer_matches(Some("a-very-long-admin-key"), key));
        assert!(!bearer_matches(None, key));
        assert!(!bearer_matches(Some("Bearer "), ""));
    }
}
