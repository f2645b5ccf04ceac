//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthState;
use crate::hub::ChatHub;
use crate::store::MessageStore;

/// Application state shared by every connection.
#[derive(Clone)]
pub struct AppState {
    /// Session/room registries and broadcast engine.
    pub hub: Arc<ChatHub>,
    /// Authentication gate.
    pub auth: AuthState,
    /// Append-only message store.
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    /// Create new application state with a fresh hub.
    pub fn new(auth: AuthState, store: Arc<dyn MessageStore>) -> Self {
        Self {
            hub: Arc::new(ChatHub::new()),
            auth,
            store,
        }
    }
}
