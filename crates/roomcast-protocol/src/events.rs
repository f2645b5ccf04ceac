//! Outbound frame types (server -> client).

use serde::{Deserialize, Serialize};

/// Frames sent from the broker to a client.
///
/// Three shapes exist on the wire: plain acknowledgments/notices
/// (`{message}`), command-level failures (`{error}`), and typed frames
/// discriminated by a `type` field. `Typed` must stay first: the union
/// is untagged and typed error frames also carry a `message` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerEvent {
    /// Broadcasts, delivery confirmations, and typed failures.
    Typed(TypedEvent),

    /// Acknowledgment or notice for the command's own connection.
    Ack { message: String },

    /// Command-level failure reply.
    Error { error: String },
}

/// Typed frames, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypedEvent {
    /// A room broadcast delivered to every member except the sender.
    #[serde(rename_all = "camelCase")]
    Message {
        room_id: String,
        message: String,
        from: String,
        time: String,
    },

    /// Persistence confirmation sent to the message sender. The body
    /// is deliberately omitted; the sender already has it.
    #[serde(rename_all = "camelCase")]
    MessageSent {
        message_id: i64,
        status: String,
        time: String,
    },

    /// Typed failure decoupled from command success, e.g. a store
    /// append that failed after the broadcast went out.
    Error { message: String },
}

impl ServerEvent {
    pub fn ack(message: impl Into<String>) -> Self {
        Self::Ack {
            message: message.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    pub fn typed_error(message: impl Into<String>) -> Self {
        Self::Typed(TypedEvent::Error {
            message: message.into(),
        })
    }

    pub fn broadcast(
        room_id: impl Into<String>,
        message: impl Into<String>,
        from: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self::Typed(TypedEvent::Message {
            room_id: room_id.into(),
            message: message.into(),
            from: from.into(),
            time: time.into(),
        })
    }

    pub fn message_sent(message_id: i64, time: impl Into<String>) -> Self {
        Self::Typed(TypedEvent::MessageSent {
            message_id,
            status: "delivered".to_string(),
            time: time.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn to_value(event: &ServerEvent) -> Value {
        serde_json::to_value(event).unwrap()
    }

    #[test]
    fn ack_shape() {
        let event = ServerEvent::ack("User Ada connected successfully");
        assert_eq!(
            to_value(&event),
            json!({"message": "User Ada connected successfully"})
        );
    }

    #[test]
    fn error_shape() {
        let event = ServerEvent::error("invalid token");
        assert_eq!(to_value(&event), json!({"error": "invalid token"}));
    }

    #[test]
    fn broadcast_shape() {
        let event = ServerEvent::broadcast("12345", "hello", "Ada", "10:15:00");
        assert_eq!(
            to_value(&event),
            json!({
                "type": "message",
                "roomId": "12345",
                "message": "hello",
                "from": "Ada",
                "time": "10:15:00"
            })
        );
    }

    #[test]
    fn message_sent_shape() {
        let event = ServerEvent::message_sent(7, "2026-01-01T00:00:00Z");
        assert_eq!(
            to_value(&event),
            json!({
                "type": "message_sent",
                "messageId": 7,
                "status": "delivered",
                "time": "2026-01-01T00:00:00Z"
            })
        );
    }

    #[test]
    fn typed_error_shape() {
        let event = ServerEvent::typed_error("error saving message");
        assert_eq!(
            to_value(&event),
            json!({"type": "error", "message": "error saving message"})
        );
    }

    #[test]
    fn round_trips_distinguish_typed_error_from_ack() {
        // A typed error also contains a `message` field; the untagged
        // union must not collapse it into an Ack.
        let event = ServerEvent::typed_error("boom");
        let text = serde_json::to_string(&event).unwrap();
        let back: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, event);

        let ack = ServerEvent::ack("hi");
        let text = serde_json::to_string(&ack).unwrap();
        let back: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ack);
    }
}
