//! Registry errors.

use thiserror::Error;

/// Lookup failures for operations that require existing state.
///
/// Commands hitting these fail all-or-nothing: an error reply goes to
/// the origin connection and neither registry is mutated.
#[derive(Debug, Error)]
pub enum HubError {
    /// No session is registered for the identity.
    #[error("user {user_id} not found")]
    SessionNotFound { user_id: String },

    /// No room is registered for the id.
    #[error("room {room_id} not found")]
    RoomNotFound { room_id: String },
}
