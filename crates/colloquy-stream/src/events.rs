use colloquy_engine::Document;
use serde::{Deserialize, Serialize};

/// Canonical form of one upstream event after normalization.
///
/// Downstream code pattern-matches these variants and never probes the raw
/// payload again.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedEvent {
    /// Progress update for display.
    Status { text: String },

    /// Answer text as accumulated so far, not yet cleaned.
    Content { text: String },

    /// A batch of retrieval results.
    Objects { items: Vec<Document> },

    /// The run finished. Both fields are engine-provided when present;
    /// the delta emitter falls back to its own accumulated state.
    Completed {
        final_text: Option<String>,
        final_objects: Option<Vec<Document>>,
    },

    /// Unknown, empty, or deliberately suppressed upstream event.
    Ignored,
}

/// Wire contract of the response stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingEvent {
    Status {
        message: String,
    },

    /// A delta of cleaned answer text, never the full text.
    Content {
        content: String,
    },

    /// Running count of accumulated retrieval results; the documents
    /// themselves travel once, in the terminal response frame.
    Objects {
        count: usize,
    },

    /// Terminal payload with the full final text.
    Response {
        response: String,
        objects: Vec<Document>,
    },

    /// Terminal on failure; a done frame never follows.
    Error {
        error: String,
    },

    Done,
}
