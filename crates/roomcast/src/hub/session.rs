//! Session record: one verified identity bound to one live transport.

use std::collections::HashSet;

use super::EventSender;

/// Server-side record for a connected identity.
///
/// The session exclusively owns its transport handle; rooms hold only
/// the identity. A later `connect` for the same identity rebinds the
/// handle instead of creating a second session.
pub struct Session {
    /// Identity id.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Ids of the rooms this session has joined.
    pub rooms: HashSet<String>,
    /// Outbound channel to the connection's write task.
    sender: EventSender,
}

impl Session {
    /// Create a session with an empty room set.
    pub fn new(user_id: &str, name: &str, sender: EventSender) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            rooms: HashSet::new(),
            sender,
        }
    }

    /// Rebind the transport to a new connection. Room memberships are
    /// untouched; they deliberately outlive the transport.
    pub fn rebind(&mut self, sender: EventSender) {
        self.sender = sender;
    }

    /// The current transport handle.
    pub fn sender(&self) -> &EventSender {
        &self.sender
    }

    /// Whether the transport can still accept frames.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}
