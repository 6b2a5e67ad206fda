use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::events::RawAgentEvent;

/// Raw upstream event stream for one agent run.
///
/// `Ok(None)` items are literal nulls from the engine; an `Err` item is
/// fatal for the request (the stream must not be polled afterwards).
pub type RawEventStream = Pin<Box<dyn Stream<Item = Result<Option<RawAgentEvent>>> + Send>>;

/// Trait for the external agent engine
///
/// The engine is an opaque black box; this seam only covers opening a
/// per-request session. Handlers hold an `Arc<dyn AgentEngine>`.
#[async_trait]
pub trait AgentEngine: Send + Sync {
    /// Open a session scoped to a single request.
    async fn open_session(&self) -> Result<Box<dyn EngineSession>>;
}

/// One engine session: exactly one run, then exactly one close.
#[async_trait]
pub trait EngineSession: Send {
    /// Identifier the engine uses to correlate this run.
    fn query_id(&self) -> &str;

    /// Start the agent run and return its raw event stream.
    async fn run(&mut self, question: &str, collection_names: &[String]) -> Result<RawEventStream>;

    /// Release engine-side resources. Must be called exactly once;
    /// `SessionGuard` enforces this across all exit paths.
    async fn close(self: Box<Self>) -> Result<()>;
}
