//! Test utilities and common setup.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc;

use roomcast::api::AppState;
use roomcast::auth::{AuthConfig, AuthState};
use roomcast::hub::EventSender;
use roomcast::store::{MessageStore, StoreError, StoredMessage};
use roomcast::ws::dispatch_frame;
use roomcast_protocol::ServerEvent;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Create a test AuthState with a JWT secret.
pub fn test_auth_state() -> AuthState {
    AuthState::new(AuthConfig {
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..AuthConfig::default()
    })
}

/// In-memory recording store.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    pub appended: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn append(
        &self,
        room_id: &str,
        content: &str,
        sender_id: &str,
    ) -> Result<StoredMessage, StoreError> {
        self.appended.lock().await.push((
            room_id.to_string(),
            content.to_string(),
            sender_id.to_string(),
        ));
        Ok(StoredMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            created_at: Utc::now(),
        })
    }
}

/// Store whose every append fails.
pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    async fn append(&self, _: &str, _: &str, _: &str) -> Result<StoredMessage, StoreError> {
        Err(StoreError::Rejected("store offline".to_string()))
    }
}

/// App state over a recording store.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (AppState::new(test_auth_state(), store.clone()), store)
}

/// App state over a store that always fails.
pub fn failing_state() -> AppState {
    AppState::new(test_auth_state(), Arc::new(FailingStore))
}

/// One simulated connection: the dispatcher writes frames into `tx`,
/// the test reads them from `rx`.
pub struct TestClient {
    pub tx: EventSender,
    pub rx: mpsc::Receiver<ServerEvent>,
}

pub fn test_client() -> TestClient {
    let (tx, rx) = mpsc::channel(64);
    TestClient { tx, rx }
}

/// Dispatch one raw frame as if it arrived on this client's connection.
pub async fn send_frame(state: &AppState, client: &TestClient, frame: &serde_json::Value) {
    dispatch_frame(state, &client.tx, &frame.to_string()).await;
}

/// Receive the next frame, failing the test after a short timeout.
pub async fn recv_frame(client: &mut TestClient) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(2), client.rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("connection channel closed")
}

/// Assert no frame is pending on this client.
pub fn assert_no_frame(client: &mut TestClient) {
    assert!(client.rx.try_recv().is_err(), "unexpected pending frame");
}

/// Connect `user_id` and drain the acknowledgment.
pub async fn connect_user(
    state: &AppState,
    client: &mut TestClient,
    user_id: &str,
    user_name: &str,
) {
    let token = state.auth.generate_token(user_id, Some(user_name)).unwrap();
    send_frame(
        state,
        client,
        &serde_json::json!({
            "command": "connect",
            "userId": user_id,
            "userName": user_name,
            "token": token,
        }),
    )
    .await;
    match recv_frame(client).await {
        ServerEvent::Ack { .. } => {}
        other => panic!("expected connect ack, got {other:?}"),
    }
}

/// Join `room_id` and drain the acknowledgment.
pub async fn join_room(state: &AppState, client: &mut TestClient, user_id: &str, room_id: &str) {
    let token = state.auth.generate_token(user_id, None).unwrap();
    send_frame(
        state,
        client,
        &serde_json::json!({
            "command": "joinRoom",
            "userId": user_id,
            "roomId": room_id,
            "token": token,
        }),
    )
    .await;
    match recv_frame(client).await {
        ServerEvent::Ack { .. } => {}
        other => panic!("expected join ack, got {other:?}"),
    }
}
