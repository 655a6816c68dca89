use crate::media::MediaFrame;
use async_trait::async_trait;
use bytes::Bytes;
use tether_core::{ConnectionId, ConnectionState};

/// What the embedding application hears from its sessions.
///
/// Every method defaults to doing nothing. Calls for one session arrive in
/// order, on that session's task.
#[async_trait]
pub trait SessionObserver: Send + Sync {
    async fn on_connection_state_change(&self, _connection_id: &ConnectionId, _state: ConnectionState) {}

    async fn on_frame(&self, _connection_id: &ConnectionId, _frame: MediaFrame) {}

    async fn on_channel_open(&self, _connection_id: &ConnectionId, _label: &str) {}

    async fn on_channel_message(&self, _connection_id: &ConnectionId, _label: &str, _data: Bytes) {}

    /// The session is gone. Sent exactly once per session.
    async fn on_closed(&self, _connection_id: &ConnectionId) {}
}
