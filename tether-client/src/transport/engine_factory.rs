use crate::transport::{TransportConfig, TransportEngine, TransportEvent, WebRtcEngine};
use anyhow::Result;
use async_trait::async_trait;
use tether_core::ConnectionId;
use tokio::sync::mpsc;

/// Builds one engine per session. The engine reports back through `events`.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(
        &self,
        connection_id: &ConnectionId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn TransportEngine>>;
}

#[derive(Clone, Default)]
pub struct WebRtcEngineFactory {
    config: TransportConfig,
}

impl WebRtcEngineFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineFactory for WebRtcEngineFactory {
    async fn create(
        &self,
        connection_id: &ConnectionId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn TransportEngine>> {
        let engine = WebRtcEngine::new(connection_id.clone(), self.config.clone(), events).await?;
        Ok(Box::new(engine))
    }
}
