//! Inbound command envelopes (client -> server).

use serde::{Deserialize, Serialize};

/// Commands sent from a client over WebSocket, tagged by `command`.
///
/// Every variant carries the declared sender identity and a signed
/// token. The broker verifies the token and cross-checks it against
/// `userId` before any state mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum ClientCommand {
    /// Register (or re-register) the sending connection as `userId`.
    #[serde(rename = "connect", rename_all = "camelCase")]
    Connect {
        user_id: String,
        user_name: String,
        token: String,
    },

    /// Join a room, creating it if the id is unknown.
    #[serde(rename = "joinRoom", rename_all = "camelCase")]
    JoinRoom {
        user_id: String,
        room_id: String,
        token: String,
    },

    /// Leave a room.
    #[serde(rename = "leaveRoom", rename_all = "camelCase")]
    LeaveRoom {
        user_id: String,
        room_id: String,
        token: String,
    },

    /// Send a chat message to a room.
    #[serde(rename = "message", rename_all = "camelCase")]
    Message {
        user_id: String,
        room_id: String,
        msg: String,
        token: String,
    },
}

impl ClientCommand {
    /// The identity the client claims to act as.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Connect { user_id, .. }
            | Self::JoinRoom { user_id, .. }
            | Self::LeaveRoom { user_id, .. }
            | Self::Message { user_id, .. } => user_id,
        }
    }

    /// The signed token attached to the envelope.
    pub fn token(&self) -> &str {
        match self {
            Self::Connect { token, .. }
            | Self::JoinRoom { token, .. }
            | Self::LeaveRoom { token, .. }
            | Self::Message { token, .. } => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_envelope() {
        let frame = r#"{"command":"connect","userId":"u1","userName":"Ada","token":"t"}"#;
        let cmd: ClientCommand = serde_json::from_str(frame).unwrap();
        match &cmd {
            ClientCommand::Connect {
                user_id, user_name, ..
            } => {
                assert_eq!(user_id, "u1");
                assert_eq!(user_name, "Ada");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cmd.user_id(), "u1");
        assert_eq!(cmd.token(), "t");
    }

    #[test]
    fn parses_message_envelope() {
        let frame =
            r#"{"command":"message","userId":"u1","roomId":"12345","msg":"hello","token":"t"}"#;
        let cmd: ClientCommand = serde_json::from_str(frame).unwrap();
        match cmd {
            ClientCommand::Message { room_id, msg, .. } => {
                assert_eq!(room_id, "12345");
                assert_eq!(msg, "hello");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_command() {
        let frame = r#"{"command":"selfDestruct","userId":"u1","token":"t"}"#;
        assert!(serde_json::from_str::<ClientCommand>(frame).is_err());
    }

    #[test]
    fn rejects_missing_token() {
        let frame = r#"{"command":"joinRoom","userId":"u1","roomId":"r1"}"#;
        assert!(serde_json::from_str::<ClientCommand>(frame).is_err());
    }
}
