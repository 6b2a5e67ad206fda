use colloquy_engine::AgentEngine;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The engine client is stateless across requests; each request opens its
/// own session through it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<dyn AgentEngine>,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<dyn AgentEngine>) -> Self {
        Self {
            config: Arc::new(config),
            engine,
        }
    }
}
