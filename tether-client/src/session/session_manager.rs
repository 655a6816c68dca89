use crate::negotiation::Negotiator;
use crate::session::{Session, SessionCommand, SessionObserver};
use crate::signaling::SignalingOutput;
use crate::transport::EngineFactory;
use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::{CodecPreference, ConnectionId, SignalEvent};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 100;
const TRANSPORT_CHANNEL_CAPACITY: usize = 256;

/// Session counters published on every open and close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub active: usize,
    pub opened: u64,
}

#[derive(Clone)]
struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    generation: u64,
}

/// Registry of live sessions, keyed by connection id.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<ConnectionId, SessionHandle>>,
    generation: Arc<AtomicU64>,
    stats: Arc<watch::Sender<SessionStats>>,
    engine_factory: Arc<dyn EngineFactory>,
    signaling: Arc<dyn SignalingOutput>,
    observer: Arc<dyn SessionObserver>,
    codec_preference: CodecPreference,
}

impl SessionManager {
    pub fn new(
        engine_factory: Arc<dyn EngineFactory>,
        signaling: Arc<dyn SignalingOutput>,
        observer: Arc<dyn SessionObserver>,
        codec_preference: CodecPreference,
    ) -> Self {
        let (stats, _) = watch::channel(SessionStats::default());

        Self {
            sessions: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(stats),
            engine_factory,
            signaling,
            observer,
            codec_preference,
        }
    }

    pub fn watch_stats(&self) -> watch::Receiver<SessionStats> {
        self.stats.subscribe()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.sessions.contains_key(connection_id)
    }

    /// Routes one decoded relay event to the session it addresses.
    /// Relay errors and undecodable frames are the caller's to report.
    pub async fn handle_signal(&self, event: SignalEvent) {
        match event {
            SignalEvent::Connect {
                connection_id,
                polite,
            } => {
                if let Err(e) = self.open(connection_id.clone(), polite).await {
                    error!("Failed to open session {}: {:#}", connection_id, e);
                }
            }

            SignalEvent::Disconnect { connection_id } => {
                info!("Relay disconnected {}", connection_id);
                self.close(&connection_id).await;
            }

            SignalEvent::Offer {
                connection_id,
                sdp,
                polite,
            } => {
                if !self.contains(&connection_id) {
                    info!("Offer for new connection {}", connection_id);
                    if let Err(e) = self.open(connection_id.clone(), polite).await {
                        error!("Failed to open session {}: {:#}", connection_id, e);
                        return;
                    }
                }
                self.send(&connection_id, SessionCommand::RemoteOffer { sdp })
                    .await;
            }

            SignalEvent::Answer { connection_id, sdp } => {
                self.send(&connection_id, SessionCommand::RemoteAnswer { sdp })
                    .await;
            }

            SignalEvent::Candidate(candidate) => {
                let connection_id = candidate.connection_id.clone();
                self.send(&connection_id, SessionCommand::RemoteCandidate(candidate))
                    .await;
            }

            SignalEvent::Error { .. }
            | SignalEvent::Unrecognized { .. }
            | SignalEvent::DecodeError { .. } => {}
        }
    }

    /// Starts a session for `connection_id`. An existing session with the
    /// same id is closed and replaced.
    pub async fn open(&self, connection_id: ConnectionId, polite: bool) -> Result<()> {
        if let Some((_, previous)) = self.sessions.remove(&connection_id) {
            warn!("Replacing existing session {}", connection_id);
            let _ = previous.commands.send(SessionCommand::Close).await;
        }

        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_CHANNEL_CAPACITY);
        let engine = self
            .engine_factory
            .create(&connection_id, transport_tx)
            .await?;

        let negotiator = Negotiator::new(
            connection_id.clone(),
            polite,
            engine,
            self.signaling.clone(),
            self.codec_preference.clone(),
        );

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let session = Session::new(negotiator, command_rx, transport_rx, self.observer.clone());

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(
            connection_id.clone(),
            SessionHandle {
                commands: command_tx,
                generation,
            },
        );
        self.stats.send_modify(|stats| {
            stats.opened += 1;
            stats.active = self.sessions.len();
        });

        let sessions = self.sessions.clone();
        let stats = self.stats.clone();
        tokio::spawn(async move {
            session.run().await;

            sessions.remove_if(&connection_id, |_, handle| handle.generation == generation);
            stats.send_modify(|s| s.active = sessions.len());
        });

        Ok(())
    }

    pub async fn close(&self, connection_id: &ConnectionId) {
        let Some((_, handle)) = self.sessions.remove(connection_id) else {
            warn!("Disconnect for unknown connection {}", connection_id);
            return;
        };
        self.stats.send_modify(|s| s.active = self.sessions.len());
        let _ = handle.commands.send(SessionCommand::Close).await;
    }

    pub async fn close_all(&self) {
        let handles: Vec<SessionHandle> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.sessions.clear();
        self.stats.send_modify(|s| s.active = 0);

        for handle in handles {
            let _ = handle.commands.send(SessionCommand::Close).await;
        }
    }

    async fn send(&self, connection_id: &ConnectionId, cmd: SessionCommand) {
        let Some(commands) = self
            .sessions
            .get(connection_id)
            .map(|handle| handle.commands.clone())
        else {
            warn!("Signal for unknown connection {}", connection_id);
            return;
        };

        if commands.send(cmd).await.is_err() {
            warn!("Session {} already finished", connection_id);
        }
    }
}
