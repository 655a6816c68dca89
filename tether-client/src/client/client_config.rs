use crate::transport::TransportConfig;
use tether_core::{CodecPreference, ConnectionId};

pub const DEFAULT_SERVER_URL: &str = "ws://localhost:80";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Websocket URL of the signaling relay.
    pub server_url: String,
    /// Id sent with `connect`; a fresh UUID when unset.
    pub connection_id: Option<ConnectionId>,
    pub codec_preference: CodecPreference,
    pub transport: TransportConfig,
    /// Stop once every session that was opened has ended.
    pub exit_on_session_close: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            connection_id: None,
            codec_preference: CodecPreference::default(),
            transport: TransportConfig::default(),
            exit_on_session_close: true,
        }
    }
}
