use crate::negotiation::Negotiator;
use crate::session::{SessionCommand, SessionObserver};
use crate::transport::TransportEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// One negotiated connection. `run` owns the negotiator and handles one
/// command or transport event at a time until the session is closed.
pub struct Session {
    negotiator: Negotiator,
    command_rx: mpsc::Receiver<SessionCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    observer: Arc<dyn SessionObserver>,
}

impl Session {
    pub fn new(
        negotiator: Negotiator,
        command_rx: mpsc::Receiver<SessionCommand>,
        transport_rx: mpsc::Receiver<TransportEvent>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            negotiator,
            command_rx,
            transport_rx,
            observer,
        }
    }

    pub async fn run(mut self) {
        let connection_id = self.negotiator.connection_id().clone();
        info!(
            "Session {} started (polite: {})",
            connection_id,
            self.negotiator.is_polite()
        );

        while !self.negotiator.is_closed() {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Closing session {}", connection_id);
                            self.negotiator.close().await;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly for {}", connection_id);
                            self.negotiator.close().await;
                        }
                    }
                }
            }
        }

        self.observer.on_closed(&connection_id).await;
        info!("Session {} finished", connection_id);
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        let connection_id = self.negotiator.connection_id().clone();

        let result = match cmd {
            SessionCommand::RemoteOffer { sdp } => self.negotiator.on_remote_offer(sdp).await,
            SessionCommand::RemoteAnswer { sdp } => self.negotiator.on_remote_answer(sdp).await,
            SessionCommand::RemoteCandidate(candidate) => {
                self.negotiator.on_remote_candidate(candidate).await;
                Ok(())
            }
            SessionCommand::Negotiate => self.negotiator.on_negotiation_needed().await,
            SessionCommand::Close => {
                info!("Closing session {} on request", connection_id);
                self.negotiator.close().await;
                Ok(())
            }
        };

        if let Err(e) = result {
            error!("Negotiation step failed for {}: {:#}", connection_id, e);
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        let connection_id = self.negotiator.connection_id().clone();

        match event {
            TransportEvent::NegotiationNeeded => {
                if let Err(e) = self.negotiator.on_negotiation_needed().await {
                    error!("Failed to send offer for {}: {:#}", connection_id, e);
                }
            }

            TransportEvent::LocalCandidate(candidate) => {
                self.negotiator.on_local_candidate(candidate).await;
            }

            TransportEvent::ConnectionStateChanged(state) => {
                self.observer
                    .on_connection_state_change(&connection_id, state)
                    .await;
                self.negotiator.on_connection_state(state).await;
            }

            TransportEvent::Frame(frame) => {
                self.observer.on_frame(&connection_id, frame).await;
            }

            TransportEvent::DataChannelOpen(label) => {
                info!("Data channel '{}' open for {}", label, connection_id);
                self.observer.on_channel_open(&connection_id, &label).await;
            }

            TransportEvent::ChannelMessage(label, data) => {
                debug!(
                    "{} bytes on '{}' from {}",
                    data.len(),
                    label,
                    connection_id
                );
                self.observer
                    .on_channel_message(&connection_id, &label, data)
                    .await;
            }
        }
    }
}
