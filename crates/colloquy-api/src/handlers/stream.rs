use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;

use colloquy_engine::SessionGuard;
use colloquy_stream::{encode, normalize, NormalizedEvent, OutgoingEvent, StreamState};

use crate::error::{ApiError, ApiResult};
use crate::routes::ask::AskRequest;
use crate::state::AppState;

/// Ask a question and stream the answer using Server-Sent Events
///
/// Frames are `data: <json>\n\n` with payload types status, content
/// (delta), objects (count), response (terminal full text), error, done.
#[utoipa::path(
    post,
    path = "/ask/stream",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Incremental answer stream", content_type = "text/event-stream"),
        (status = 400, description = "Empty question")
    ),
    tag = "ask"
)]
pub async fn ask_question_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Response> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".to_string()));
    }

    let engine = Arc::clone(&state.engine);

    let frames = async_stream::stream! {
        let mut stream_state = StreamState::new();

        // The boot status goes through the state so an identical upstream
        // status right after it is still suppressed.
        for event in stream_state.apply(NormalizedEvent::Status {
            text: "Initializing...".to_string(),
        }) {
            let (frame, failed) = frame_or_error(&event);
            yield frame;
            if failed {
                return;
            }
        }

        // 1. Acquire the engine session for this request
        let mut guard = match engine.open_session().await {
            Ok(session) => SessionGuard::new(session),
            Err(e) => {
                tracing::error!("Failed to open engine session: {}", e);
                yield error_frame(&e.to_string());
                return;
            }
        };

        // 2. Start the run
        let mut events = match guard.run(&req.question, &req.collection_names).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Failed to start engine run: {}", e);
                yield error_frame(&e.to_string());
                guard.close().await;
                return;
            }
        };

        // 3. Pull one upstream event at a time; the next pull waits until
        // this frame has been handed to the transport
        while let Some(item) = events.next().await {
            match item {
                Ok(raw) => {
                    for event in stream_state.apply(normalize(raw)) {
                        let (frame, failed) = frame_or_error(&event);
                        yield frame;
                        if failed {
                            guard.close().await;
                            return;
                        }
                    }
                    if stream_state.is_terminal() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Engine stream failed: {}", e);
                    yield error_frame(&e.to_string());
                    guard.close().await;
                    return;
                }
            }
        }

        // 4. Release the session; disconnects are covered by the guard's
        // drop path instead
        guard.close().await;
    };

    let body = Body::from_stream(frames.map(Ok::<_, Infallible>));

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// Encode one event, falling back to an error frame on encoder failure.
/// The bool marks the failure so the caller can terminate the stream.
fn frame_or_error(event: &OutgoingEvent) -> (String, bool) {
    match encode(event) {
        Ok(frame) => (frame, false),
        Err(e) => {
            tracing::error!("Failed to encode outgoing event: {}", e);
            (error_frame(&e.to_string()), true)
        }
    }
}

fn error_frame(message: &str) -> String {
    encode(&OutgoingEvent::Error {
        error: message.to_string(),
    })
    .unwrap_or_else(|_| "data: {\"type\":\"error\",\"error\":\"stream failed\"}\n\n".to_string())
}
