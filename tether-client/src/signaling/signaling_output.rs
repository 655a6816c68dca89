use async_trait::async_trait;
use tether_core::{ConnectionId, IceCandidateRecord};

/// Outbound half of the relay connection. Sessions send offers, answers and
/// candidates through it without knowing how the relay is reached.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Register `connection_id` with the relay.
    async fn send_connect(&self, connection_id: ConnectionId);

    async fn send_disconnect(&self, connection_id: ConnectionId);

    async fn send_offer(&self, connection_id: ConnectionId, sdp: String);

    async fn send_answer(&self, connection_id: ConnectionId, sdp: String);

    async fn send_candidate(&self, connection_id: ConnectionId, candidate: IceCandidateRecord);
}
