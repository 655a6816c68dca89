mod connection;
mod ice_server;
mod session_description;
mod state;

pub use connection::ConnectionId;
pub use ice_server::IceServerConfig;
pub use session_description::{SdpKind, SessionDescription};
pub use state::{ConnectionState, SignalingState};
