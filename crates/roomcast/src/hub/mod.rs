//! Session and room registries plus the broadcast engine.
//!
//! [`ChatHub`] is the process-wide state container shared by every
//! connection. Both registries are key-indexed `DashMap`s; membership
//! mutation and the member snapshot taken for a broadcast happen while
//! holding the room's map entry, so concurrent joins, leaves, and
//! broadcasts on one room never observe a half-applied view. Session
//! and room entries are never held at the same time.

mod error;
mod room;
mod session;

pub use error::HubError;
pub use room::Room;
pub use session::Session;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;

use roomcast_protocol::ServerEvent;

/// Sender name used in broadcasts when the sender is no longer in the
/// session registry.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// A sender for outbound frames to one connection.
pub type EventSender = mpsc::Sender<ServerEvent>;

/// Result of a `connect` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connected {
    /// A new session was created.
    New,
    /// An existing session had its transport rebound (reconnection).
    Rebound,
}

/// Result of a `joinRoom` mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room did not exist; it was created with the caller as its
    /// sole member.
    Created,
    /// The caller joined (or already belonged to) an existing room.
    Joined {
        user_name: String,
        room_name: String,
        /// False when the caller was already a member (idempotent join).
        newly_added: bool,
    },
}

/// Names resolved while leaving a room, for the acknowledgment frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub user_name: String,
    pub room_name: String,
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients the frame was handed to.
    pub delivered: usize,
    /// Display names of recipients whose delivery failed.
    pub failed: Vec<String>,
}

/// Plain-data view of both registries, for equality assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSnapshot {
    /// Identity -> joined room ids.
    pub sessions: BTreeMap<String, BTreeSet<String>>,
    /// Room id -> member identities.
    pub rooms: BTreeMap<String, BTreeSet<String>>,
}

/// Process-wide chat state: identity -> session, room id -> room.
pub struct ChatHub {
    sessions: DashMap<String, Session>,
    rooms: DashMap<String, Room>,
}

impl ChatHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    /// Register `user_id` with the given transport.
    ///
    /// Idempotent by identity: a second connect rebinds the existing
    /// session's transport instead of creating a duplicate, so later
    /// broadcasts reach only the latest connection.
    pub fn connect_session(&self, user_id: &str, name: &str, sender: EventSender) -> Connected {
        match self.sessions.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let session = entry.get_mut();
                session.name = name.to_string();
                session.rebind(sender);
                info!("user {} ({}) reconnected", name, user_id);
                Connected::Rebound
            }
            Entry::Vacant(entry) => {
                entry.insert(Session::new(user_id, name, sender));
                info!(
                    "user {} ({}) connected, total sessions: {}",
                    name,
                    user_id,
                    self.sessions.len()
                );
                Connected::New
            }
        }
    }

    /// Add `user_id` to `room_id`, creating the room lazily.
    ///
    /// Requires an existing session; fails without mutation otherwise.
    /// A duplicate join is a no-op beyond the membership check.
    pub fn join_room(&self, user_id: &str, room_id: &str) -> Result<JoinOutcome, HubError> {
        let user_name = self
            .sessions
            .get(user_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| HubError::SessionNotFound {
                user_id: user_id.to_string(),
            })?;

        let (created, newly_added, room_name) = match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(mut entry) => {
                let room = entry.get_mut();
                let added = room.add_member(user_id);
                (false, added, room.name.clone())
            }
            Entry::Vacant(entry) => {
                let mut room = Room::new(room_id, format!("Room-{room_id}"));
                room.add_member(user_id);
                let name = room.name.clone();
                entry.insert(room);
                debug!("created room {}", room_id);
                (true, true, name)
            }
        };

        // The session can be removed between the existence check and
        // this point; undo the room side rather than leave a dangling
        // member behind.
        match self.sessions.get_mut(user_id) {
            Some(mut session) => {
                session.rooms.insert(room_id.to_string());
            }
            None => {
                if let Some(mut room) = self.rooms.get_mut(room_id) {
                    room.remove_member(user_id);
                }
                return Err(HubError::SessionNotFound {
                    user_id: user_id.to_string(),
                });
            }
        }

        if created {
            Ok(JoinOutcome::Created)
        } else {
            Ok(JoinOutcome::Joined {
                user_name,
                room_name,
                newly_added,
            })
        }
    }

    /// Remove `user_id` from `room_id`.
    ///
    /// Both the session and the room must exist; fails with zero
    /// mutation otherwise. Removes the identity from the room's member
    /// set and the room from the session's room set as one logical
    /// step. Absent membership is a no-op.
    pub fn leave_room(&self, user_id: &str, room_id: &str) -> Result<LeaveOutcome, HubError> {
        let user_name = self
            .sessions
            .get(user_id)
            .map(|s| s.name.clone())
            .ok_or_else(|| HubError::SessionNotFound {
                user_id: user_id.to_string(),
            })?;
        let room_name = self
            .rooms
            .get(room_id)
            .map(|r| r.name.clone())
            .ok_or_else(|| HubError::RoomNotFound {
                room_id: room_id.to_string(),
            })?;

        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.remove_member(user_id);
        }
        if let Some(mut session) = self.sessions.get_mut(user_id) {
            session.rooms.remove(room_id);
        }

        Ok(LeaveOutcome {
            user_name,
            room_name,
        })
    }

    /// Remove a session and cascade the removal into every room it
    /// belonged to, so rooms never retain dangling member references.
    pub fn remove_session(&self, user_id: &str) -> bool {
        let Some((_, session)) = self.sessions.remove(user_id) else {
            return false;
        };
        for room_id in &session.rooms {
            if let Some(mut room) = self.rooms.get_mut(room_id) {
                room.remove_member(user_id);
            }
        }
        info!("removed session {} from {} rooms", user_id, session.rooms.len());
        true
    }

    /// Fan `text` out to every current member of `room_id` except the
    /// sender whose transport is open.
    ///
    /// Each delivery failure is caught individually, reported back to
    /// the sender as a typed non-fatal notice, and does not interrupt
    /// delivery to the remaining members. A missing room is a no-op.
    pub async fn broadcast_message(
        &self,
        room_id: &str,
        text: &str,
        sender_id: &str,
    ) -> DeliveryReport {
        let members: Vec<String> = match self.rooms.get(room_id) {
            Some(room) => room.members().iter().cloned().collect(),
            None => return DeliveryReport::default(),
        };

        let from = self
            .sessions
            .get(sender_id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
        let time = Utc::now().format("%H:%M:%S").to_string();
        let event = ServerEvent::broadcast(room_id, text, from, time);

        // Collect open transports before awaiting; map guards must not
        // be held across an await point.
        let mut recipients: Vec<(String, EventSender)> = Vec::with_capacity(members.len());
        for member_id in &members {
            if member_id == sender_id {
                continue;
            }
            if let Some(session) = self.sessions.get(member_id) {
                if session.is_open() {
                    recipients.push((session.name.clone(), session.sender().clone()));
                }
            }
        }

        let mut report = DeliveryReport::default();
        for (name, tx) in recipients {
            match tx.send(event.clone()).await {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    warn!("failed to deliver message to {} in room {}", name, room_id);
                    report.failed.push(name);
                }
            }
        }

        if !report.failed.is_empty() {
            let sender_tx = self.sessions.get(sender_id).map(|s| s.sender().clone());
            if let Some(tx) = sender_tx {
                for name in &report.failed {
                    let _ = tx
                        .send(ServerEvent::typed_error(format!(
                            "failed to deliver message to {name}"
                        )))
                        .await;
                }
            }
        }

        report
    }

    /// Deliver one frame to a single session's transport.
    pub async fn send_to(&self, user_id: &str, event: ServerEvent) -> bool {
        let tx = match self.sessions.get(user_id) {
            Some(session) => session.sender().clone(),
            None => return false,
        };
        tx.send(event).await.is_ok()
    }

    /// Whether a session exists for `user_id`.
    pub fn has_session(&self, user_id: &str) -> bool {
        self.sessions.contains_key(user_id)
    }

    /// Whether a room exists for `room_id`.
    pub fn has_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Room ids a session has joined.
    pub fn session_rooms(&self, user_id: &str) -> Option<BTreeSet<String>> {
        self.sessions
            .get(user_id)
            .map(|s| s.rooms.iter().cloned().collect())
    }

    /// Member identities of a room.
    pub fn room_members(&self, room_id: &str) -> Option<BTreeSet<String>> {
        self.rooms
            .get(room_id)
            .map(|r| r.members().iter().cloned().collect())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Plain-data view of both registries for equality assertions.
    pub fn snapshot(&self) -> HubSnapshot {
        let sessions = self
            .sessions
            .iter()
            .map(|e| (e.key().clone(), e.value().rooms.iter().cloned().collect()))
            .collect();
        let rooms = self
            .rooms
            .iter()
            .map(|e| (e.key().clone(), e.value().members().iter().cloned().collect()))
            .collect();
        HubSnapshot { sessions, rooms }
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}
