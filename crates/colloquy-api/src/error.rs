use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Engine error: {0}")]
    Engine(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Engine(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error processing question: {}", e),
            ),
        };

        if status.is_server_error() {
            tracing::error!("API error: {}", self);
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
