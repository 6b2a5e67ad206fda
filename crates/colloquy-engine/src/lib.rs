pub mod client;
pub mod events;
pub mod session;
pub mod traits;

pub use client::{EngineClient, EngineConfig};
pub use events::{DecodedLine, Document, RawAgentEvent};
pub use session::SessionGuard;
pub use traits::{AgentEngine, EngineSession, RawEventStream};
