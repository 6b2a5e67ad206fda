use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// Service identity stub
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "Colloquy API Server",
    }))
}

/// Health check with engine connection detail
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health details")),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "engine_url": state.config.engine.base_url,
    }))
}
