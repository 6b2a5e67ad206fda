//! Maps raw engine events into the closed [`NormalizedEvent`] set.
//!
//! Payload extraction is defensive throughout: a raw event whose payload
//! does not have the expected shape becomes `Ignored`, never an error, so
//! one bad event cannot abort the stream.

use colloquy_engine::{Document, RawAgentEvent};
use serde_json::Value;

use crate::events::NormalizedEvent;

pub fn normalize(raw: Option<RawAgentEvent>) -> NormalizedEvent {
    let Some(raw) = raw else {
        return NormalizedEvent::Ignored;
    };

    match raw.kind.as_str() {
        "status" => {
            let text = status_text(&raw.payload);
            if text.is_empty() {
                NormalizedEvent::Ignored
            } else {
                NormalizedEvent::Status { text }
            }
        }

        // Decision-step reasoning is never surfaced to the client; it is
        // far too verbose for a status line.
        "tree_update" => NormalizedEvent::Ignored,

        "text" | "response" | "text_with_title" => {
            let text = content_text(&raw.payload);
            if text.is_empty() {
                NormalizedEvent::Ignored
            } else {
                NormalizedEvent::Content { text }
            }
        }

        "result" => match object_items(&raw.payload) {
            Some(items) => NormalizedEvent::Objects { items },
            None => NormalizedEvent::Ignored,
        },

        "completed" => NormalizedEvent::Completed {
            final_text: history_text(&raw.payload),
            final_objects: retrieved_objects(&raw.payload),
        },

        _ => NormalizedEvent::Ignored,
    }
}

fn status_text(payload: &Value) -> String {
    match payload {
        Value::Object(map) => map
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn content_text(payload: &Value) -> String {
    match payload {
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn object_items(payload: &Value) -> Option<Vec<Document>> {
    let items = payload.get("objects")?.as_array()?;
    if items.is_empty() {
        return None;
    }
    Some(items.to_vec())
}

/// Final text from the run's conversation history, when the engine
/// provides one.
fn history_text(payload: &Value) -> Option<String> {
    payload
        .get("conversation_history")?
        .as_array()?
        .last()?
        .get("content")?
        .as_str()
        .map(String::from)
}

/// Engine-level retrieval list, preferred over the objects accumulated
/// from result events.
fn retrieved_objects(payload: &Value) -> Option<Vec<Document>> {
    let objects = payload.get("retrieved_objects")?.as_array()?;
    if objects.is_empty() {
        return None;
    }
    Some(objects.to_vec())
}
