mod signaling_output;
mod signaling_service;
mod ws_connector;

pub use signaling_output::*;
pub use signaling_service::*;
pub use ws_connector::*;
