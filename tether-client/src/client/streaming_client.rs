use crate::client::ClientConfig;
use crate::session::{SessionManager, SessionObserver};
use crate::signaling::{SignalingOutput, ws_connect};
use crate::transport::{EngineFactory, WebRtcEngineFactory};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tether_core::{ConnectionId, SignalEvent, decode_text};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Connects to the relay, registers a connection id and keeps the sessions
/// the relay hands out until it is told to stop.
pub struct StreamingClient {
    config: ClientConfig,
    observer: Arc<dyn SessionObserver>,
    engine_factory: Arc<dyn EngineFactory>,
}

impl StreamingClient {
    pub fn new(config: ClientConfig, observer: Arc<dyn SessionObserver>) -> Self {
        let engine_factory = Arc::new(WebRtcEngineFactory::new(config.transport.clone()));
        Self {
            config,
            observer,
            engine_factory,
        }
    }

    pub fn with_engine_factory(mut self, engine_factory: Arc<dyn EngineFactory>) -> Self {
        self.engine_factory = engine_factory;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs until the relay closes, `shutdown` resolves or, with
    /// `exit_on_session_close`, the last session ends.
    pub async fn run<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let mut relay = ws_connect(&self.config.server_url).await?;
        let inbound = relay.take_inbound();
        let signaling = Arc::new(relay.signaling());

        let result = self.serve(inbound, signaling, shutdown).await;

        relay.close().await;
        result
    }

    /// The dispatch loop over an already open relay. `inbound` yields one
    /// JSON envelope per item.
    pub async fn serve<F>(
        &self,
        mut inbound: mpsc::UnboundedReceiver<String>,
        signaling: Arc<dyn SignalingOutput>,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let connection_id = self
            .config
            .connection_id
            .clone()
            .unwrap_or_else(ConnectionId::new);

        let manager = SessionManager::new(
            self.engine_factory.clone(),
            signaling.clone(),
            self.observer.clone(),
            self.config.codec_preference.clone(),
        );
        let mut stats = manager.watch_stats();

        info!("Registering connection {}", connection_id);
        signaling.send_connect(connection_id.clone()).await;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                frame = inbound.recv() => {
                    match frame {
                        Some(text) => dispatch(&manager, &text).await,
                        None => {
                            info!("Signaling relay closed the connection");
                            break;
                        }
                    }
                }

                changed = stats.changed(), if self.config.exit_on_session_close => {
                    if changed.is_err() {
                        break;
                    }
                    let current = *stats.borrow_and_update();
                    if current.opened > 0 && current.active == 0 {
                        info!("Last session ended");
                        break;
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        signaling.send_disconnect(connection_id).await;
        manager.close_all().await;
        Ok(())
    }
}

async fn dispatch(manager: &SessionManager, text: &str) {
    debug!("<- {}", text);

    match decode_text(text) {
        SignalEvent::Error { message } => error!("Relay reported an error: {}", message),
        SignalEvent::Unrecognized { kind } => warn!("Ignoring envelope of unknown type '{}'", kind),
        SignalEvent::DecodeError { reason } => warn!("Dropping undecodable signal: {}", reason),
        event => manager.handle_signal(event).await,
    }
}
