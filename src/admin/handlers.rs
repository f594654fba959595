use axum::{extract::State, Json};
use serde::Serialize;

use crate::gateway::GatewayStatus;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
    pub text_model: String,
    pub image_model: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let status = if state.gateway.state().breaker.is_open() {
        "cooling-down"
    } else {
        "operational"
    };

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status,
        uptime_secs: state.started_at.elapsed().as_secs(),
        text_model: state.config.provider.text_model.clone(),
        image_model: state.config.provider.image_model.clone(),
    })
}

/// Breaker deadline, cache ages and in-flight calls.
pub async fn get_gateway(State(state): State<AppState>) -> Json<GatewayStatus> {
    Json(state.gateway.status())
}
