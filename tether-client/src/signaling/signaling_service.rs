use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use tether_core::{ConnectionId, IceCandidateRecord, OutboundSignal, encode_text};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

/// Encodes outbound signals and queues them for the websocket writer task.
#[derive(Clone)]
pub struct SignalingService {
    ws_tx: mpsc::UnboundedSender<Message>,
}

impl SignalingService {
    pub fn new(ws_tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { ws_tx }
    }

    pub fn send_signal(&self, signal: OutboundSignal) {
        let json = match encode_text(&signal) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                return;
            }
        };

        debug!("-> {}", json);
        if self.ws_tx.send(Message::Text(json.into())).is_err() {
            warn!(
                "Relay connection is gone, dropping signal for {}",
                signal.connection_id()
            );
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ws_tx.is_closed()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_connect(&self, connection_id: ConnectionId) {
        self.send_signal(OutboundSignal::Connect { connection_id });
    }

    async fn send_disconnect(&self, connection_id: ConnectionId) {
        self.send_signal(OutboundSignal::Disconnect { connection_id });
    }

    async fn send_offer(&self, connection_id: ConnectionId, sdp: String) {
        self.send_signal(OutboundSignal::Offer { connection_id, sdp });
    }

    async fn send_answer(&self, connection_id: ConnectionId, sdp: String) {
        self.send_signal(OutboundSignal::Answer { connection_id, sdp });
    }

    async fn send_candidate(&self, connection_id: ConnectionId, candidate: IceCandidateRecord) {
        self.send_signal(OutboundSignal::Candidate {
            connection_id,
            candidate,
        });
    }
}
