use axum::extract::State;
use axum::Json;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use colloquy_engine::{Document, SessionGuard};
use colloquy_stream::{normalize, OutgoingEvent, StreamState};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AskRequest {
    pub question: String,
    #[serde(default = "default_collections")]
    pub collection_names: Vec<String>,
}

fn default_collections() -> Vec<String> {
    vec!["Transcript".to_string()]
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AskResponse {
    pub response: String,
    #[schema(value_type = Vec<Object>)]
    pub objects: Vec<Document>,
}

/// Ask a question and wait for the complete answer
///
/// Runs the same reconciliation pipeline as the streaming endpoint but
/// collects it to completion and answers with one JSON body.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Final answer with retrieval results", body = AskResponse),
        (status = 400, description = "Empty question"),
        (status = 500, description = "Engine failure")
    ),
    tag = "ask"
)]
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".to_string()));
    }

    let session = state.engine.open_session().await?;
    let mut guard = SessionGuard::new(session);

    let result = run_to_completion(&mut guard, &req).await;
    guard.close().await;

    let (response, objects) = result?;
    Ok(Json(AskResponse { response, objects }))
}

async fn run_to_completion(
    guard: &mut SessionGuard,
    req: &AskRequest,
) -> anyhow::Result<(String, Vec<Document>)> {
    let mut events = guard.run(&req.question, &req.collection_names).await?;
    let mut state = StreamState::new();
    let mut final_answer = None;

    while let Some(item) = events.next().await {
        let raw = item?;
        for event in state.apply(normalize(raw)) {
            if let OutgoingEvent::Response { response, objects } = event {
                final_answer = Some((response, objects));
            }
        }
        if state.is_terminal() {
            break;
        }
    }

    final_answer.ok_or_else(|| anyhow::anyhow!("Engine run ended without completing"))
}
