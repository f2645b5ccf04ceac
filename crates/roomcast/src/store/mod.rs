//! Message store boundary.
//!
//! `message` commands append to an external append-only store. The
//! append is deliberately decoupled from fan-out: a store failure is
//! reported to the sender as its own typed error and never suppresses
//! delivery.

mod sqlite;

pub use sqlite::SqliteMessageStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Handle to a persisted message.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    /// Store-assigned message id.
    pub id: i64,
    /// When the store accepted the message.
    pub created_at: DateTime<Utc>,
}

/// Persistence errors, distinct from delivery errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store rejected the append.
    #[error("append rejected: {0}")]
    Rejected(String),
}

/// Append-only message store keyed by room, content, and sender.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message, returning its id and timestamp.
    async fn append(
        &self,
        room_id: &str,
        content: &str,
        sender_id: &str,
    ) -> Result<StoredMessage, StoreError>;
}
