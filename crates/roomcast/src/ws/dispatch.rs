//! Command dispatcher.
//!
//! One inbound frame is one command envelope. Every command is
//! authenticated before any state mutation; every failure becomes a
//! structured error reply on the origin connection, which stays open.

use log::{error, warn};
use thiserror::Error;

use roomcast_protocol::{ClientCommand, ServerEvent};

use crate::api::AppState;
use crate::auth::AuthError;
use crate::hub::{Connected, EventSender, HubError, JoinOutcome};

/// Failures that convert to a `{error}` reply frame.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Hub(#[from] HubError),
}

/// Dispatch one raw inbound frame.
///
/// Malformed frames and failed commands reply with an error frame and
/// return; nothing propagates out to kill the connection's read loop.
pub async fn dispatch_frame(state: &AppState, conn_tx: &EventSender, text: &str) {
    let cmd = match serde_json::from_str::<ClientCommand>(text) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!("malformed frame: {}", e);
            let _ = conn_tx.send(ServerEvent::error("invalid command")).await;
            return;
        }
    };

    let user_id = cmd.user_id().to_string();
    if let Err(e) = handle_command(state, conn_tx, cmd).await {
        warn!("command from {} failed: {}", user_id, e);
        let _ = conn_tx.send(ServerEvent::error(e.to_string())).await;
    }
}

/// Route one authenticated command to its operation.
async fn handle_command(
    state: &AppState,
    conn_tx: &EventSender,
    cmd: ClientCommand,
) -> Result<(), CommandError> {
    // The gate runs before any registry mutation regardless of command
    // kind; the verified claim must match the declared identity.
    state.auth.authorize_command(cmd.token(), cmd.user_id())?;

    match cmd {
        ClientCommand::Connect {
            user_id, user_name, ..
        } => {
            let ack = match state
                .hub
                .connect_session(&user_id, &user_name, conn_tx.clone())
            {
                Connected::Rebound => format!("Welcome back, {user_name}!"),
                Connected::New => format!("User {user_name} connected successfully"),
            };
            let _ = conn_tx.send(ServerEvent::ack(ack)).await;
        }

        ClientCommand::JoinRoom {
            user_id, room_id, ..
        } => match state.hub.join_room(&user_id, &room_id)? {
            JoinOutcome::Created => {
                let _ = conn_tx
                    .send(ServerEvent::ack(format!("Created and joined room {room_id}")))
                    .await;
            }
            JoinOutcome::Joined {
                user_name,
                room_name,
                ..
            } => {
                let _ = conn_tx
                    .send(ServerEvent::ack(format!(
                        "User {user_name} joined room {room_name}"
                    )))
                    .await;
                state
                    .hub
                    .broadcast_message(&room_id, &format!("User {user_name} joined room"), &user_id)
                    .await;
            }
        },

        ClientCommand::LeaveRoom {
            user_id, room_id, ..
        } => {
            let outcome = state.hub.leave_room(&user_id, &room_id)?;
            let _ = conn_tx
                .send(ServerEvent::ack(format!(
                    "User {} left room {}",
                    outcome.user_name, outcome.room_name
                )))
                .await;
            state
                .hub
                .broadcast_message(
                    &room_id,
                    &format!("User {} left room", outcome.user_name),
                    &user_id,
                )
                .await;
        }

        ClientCommand::Message {
            user_id,
            room_id,
            msg,
            ..
        } => {
            if !state.hub.has_session(&user_id) {
                return Err(HubError::SessionNotFound { user_id }.into());
            }
            if !state.hub.has_room(&room_id) {
                // Error reply to the sender only: no broadcast, no
                // persistence attempt.
                return Err(HubError::RoomNotFound { room_id }.into());
            }

            // Fan-out first. The store append is decoupled: its failure
            // must never suppress delivery to the other members.
            state.hub.broadcast_message(&room_id, &msg, &user_id).await;

            match state.store.append(&room_id, &msg, &user_id).await {
                Ok(saved) => {
                    let _ = conn_tx
                        .send(ServerEvent::message_sent(
                            saved.id,
                            saved.created_at.to_rfc3339(),
                        ))
                        .await;
                }
                Err(err) => {
                    error!("failed to persist message for room {}: {}", room_id, err);
                    let _ = conn_tx
                        .send(ServerEvent::typed_error("error saving message to store"))
                        .await;
                }
            }
        }
    }

    Ok(())
}
