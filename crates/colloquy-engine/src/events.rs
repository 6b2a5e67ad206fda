use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Retrieval result passed through to the client untouched.
///
/// The engine decides the shape (transcript segments, metadata, scores);
/// nothing in this crate or downstream interprets the fields.
pub type Document = Value;

/// One raw event from the agent engine, in its canonical frontend shape.
///
/// `kind` is open-ended; only a known subset is meaningful downstream and
/// unknown kinds are ignored there, not rejected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAgentEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl RawAgentEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Convert a wire JSON value into its canonical shape.
    ///
    /// Returns None when the value does not expose the `{type, payload}`
    /// contract (missing or non-string `type`). A missing payload is fine.
    pub fn from_wire(value: Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj.get("type")?.as_str()?.to_string();
        let payload = obj.get("payload").cloned().unwrap_or(Value::Null);
        Some(Self { kind, payload })
    }
}

/// Outcome of decoding one NDJSON line from the engine.
#[derive(Debug)]
pub enum DecodedLine {
    /// Blank line, nothing to do.
    Empty,
    /// The engine emitted a literal `null` event.
    Null,
    /// A well-formed event.
    Event(RawAgentEvent),
    /// Unparseable or not convertible to the canonical shape.
    Invalid,
}

/// Decode one line of the engine's NDJSON event stream.
pub fn decode_line(line: &str) -> DecodedLine {
    let line = line.trim();
    if line.is_empty() {
        return DecodedLine::Empty;
    }

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Null) => DecodedLine::Null,
        Ok(value) => match RawAgentEvent::from_wire(value) {
            Some(event) => DecodedLine::Event(event),
            None => DecodedLine::Invalid,
        },
        Err(_) => DecodedLine::Invalid,
    }
}
