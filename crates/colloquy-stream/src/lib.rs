pub mod cleaner;
pub mod encoder;
pub mod events;
pub mod normalizer;
pub mod state;

pub use cleaner::clean;
pub use encoder::encode;
pub use events::{NormalizedEvent, OutgoingEvent};
pub use normalizer::normalize;
pub use state::StreamState;
