//! Wire frame types for Roomcast client/server communication.
//!
//! Every inbound WebSocket text frame is one JSON [`ClientCommand`]
//! envelope carrying its own auth token. Outbound frames are
//! [`ServerEvent`]s:
//!
//! ```text
//! Client --[{command, userId, token, ...}]--> Broker
//! Client <--[{message} | {error} | {type: ...}]-- Broker
//! ```
//!
//! The broker authenticates the envelope before acting on it, so the
//! token travels with the command rather than with the connection.

pub mod commands;
pub mod events;

pub use commands::ClientCommand;
pub use events::{ServerEvent, TypedEvent};
