mod client_config;
mod streaming_client;

pub use client_config::*;
pub use streaming_client::*;
