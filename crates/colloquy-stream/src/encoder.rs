use anyhow::{Context, Result};

use crate::events::OutgoingEvent;

/// Serialize one outgoing event to its wire frame.
///
/// One frame per event, emitted as soon as produced; there is no batching
/// or buffering beyond the frame itself.
pub fn encode(event: &OutgoingEvent) -> Result<String> {
    let json = serde_json::to_string(event).context("Failed to encode outgoing event")?;
    Ok(format!("data: {}\n\n", json))
}
