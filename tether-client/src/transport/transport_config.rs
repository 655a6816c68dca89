use tether_core::IceServerConfig;

pub const DEFAULT_DATA_CHANNEL_LABEL: &str = "input";

/// WebRTC settings applied to every engine the client creates.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Open a data channel and recv-only transceivers right after the engine
    /// is built, so this side sends the first offer.
    pub offer_on_connect: bool,
    pub data_channel_label: String,
    pub receive_video: bool,
    pub receive_audio: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![
                IceServerConfig::stun("stun:stun.l.google.com:19302"),
                IceServerConfig::stun("stun:stun1.l.google.com:19302"),
            ],
            offer_on_connect: true,
            data_channel_label: DEFAULT_DATA_CHANNEL_LABEL.to_owned(),
            receive_video: true,
            receive_audio: false,
        }
    }
}
