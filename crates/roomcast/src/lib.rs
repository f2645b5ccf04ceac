//! Roomcast broker library.
//!
//! Core components of the real-time multi-room chat coordination
//! broker: the authentication gate, the session/room registries with
//! the broadcast engine, the message store boundary, and the WebSocket
//! command dispatcher.

pub mod api;
pub mod auth;
pub mod hub;
pub mod store;
pub mod ws;
