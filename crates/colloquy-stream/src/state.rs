//! Per-request delta emission over the cleaned answer text.
//!
//! The policy is extension-or-nothing: a delta is streamed only when the
//! newly cleaned text is a strict string-prefix extension of what was
//! already emitted. Anything else (the agent replaced or reordered
//! content) is absorbed silently and reconciled by the terminal response
//! frame. A generic diff would complicate the at-most-once guarantee for
//! no visible benefit.

use colloquy_engine::Document;

use crate::cleaner::clean;
use crate::events::{NormalizedEvent, OutgoingEvent};

/// Mutable state for one request's response stream.
///
/// Owned exclusively by the request handler; applying an event returns
/// the outgoing frames it produced and performs no I/O.
#[derive(Debug, Default)]
pub struct StreamState {
    accumulated: String,
    last_status: String,
    objects: Vec<Document>,
    terminal: bool,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The terminal response and done frames have been produced; the
    /// caller must stop pulling upstream events.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Longest cleaned text computed so far.
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn apply(&mut self, event: NormalizedEvent) -> Vec<OutgoingEvent> {
        match event {
            NormalizedEvent::Status { text } => self.apply_status(text),
            NormalizedEvent::Content { text } => self.apply_content(&text),
            NormalizedEvent::Objects { items } => self.apply_objects(items),
            NormalizedEvent::Completed {
                final_text,
                final_objects,
            } => self.apply_completed(final_text, final_objects),
            NormalizedEvent::Ignored => Vec::new(),
        }
    }

    fn apply_status(&mut self, text: String) -> Vec<OutgoingEvent> {
        if text == self.last_status {
            return Vec::new();
        }
        self.last_status = text.clone();
        vec![OutgoingEvent::Status { message: text }]
    }

    fn apply_content(&mut self, text: &str) -> Vec<OutgoingEvent> {
        let cleaned = clean(text);

        // Cleaning may eat the entire snapshot; emitted text is never
        // un-set by a later empty one.
        if cleaned.is_empty() || cleaned == self.accumulated {
            return Vec::new();
        }

        if self.accumulated.is_empty() {
            self.accumulated = cleaned.clone();
            return vec![OutgoingEvent::Content { content: cleaned }];
        }

        if cleaned.starts_with(&self.accumulated) {
            let delta = cleaned[self.accumulated.len()..].to_string();
            self.accumulated = cleaned;
            if delta.is_empty() {
                return Vec::new();
            }
            return vec![OutgoingEvent::Content { content: delta }];
        }

        // Not an extension: the agent replaced or reordered earlier text.
        // Withhold the delta and let the terminal event reconcile.
        self.accumulated = cleaned;
        Vec::new()
    }

    fn apply_objects(&mut self, items: Vec<Document>) -> Vec<OutgoingEvent> {
        self.objects.extend(items);
        vec![OutgoingEvent::Objects {
            count: self.objects.len(),
        }]
    }

    fn apply_completed(
        &mut self,
        final_text: Option<String>,
        final_objects: Option<Vec<Document>>,
    ) -> Vec<OutgoingEvent> {
        let resolved = final_text.unwrap_or_else(|| self.accumulated.clone());
        let cleaned_final = clean(&resolved);
        let mut events = Vec::new();

        if cleaned_final != self.accumulated {
            if !self.accumulated.is_empty() && cleaned_final.starts_with(&self.accumulated) {
                let remaining = cleaned_final[self.accumulated.len()..].to_string();
                if !remaining.is_empty() {
                    events.push(OutgoingEvent::Content { content: remaining });
                }
            } else if self.accumulated.is_empty() {
                events.push(OutgoingEvent::Content {
                    content: cleaned_final.clone(),
                });
            }
            // Superseded text was already absorbed without streaming; the
            // response frame below carries the correction.
        }

        events.push(OutgoingEvent::Response {
            response: cleaned_final.clone(),
            objects: final_objects.unwrap_or_else(|| self.objects.clone()),
        });
        events.push(OutgoingEvent::Done);

        self.accumulated = cleaned_final;
        self.terminal = true;
        events
    }
}
