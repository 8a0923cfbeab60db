pub mod commands;
pub mod events;
pub mod types;

pub use commands::ConnectionCommand;
pub use events::ConnectionEvent;
pub use types::{ChatMessage, ConnectionState};
