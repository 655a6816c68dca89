mod frame_sink;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tether_client::{ClientConfig, StreamingClient, TransportConfig};
use tether_core::{CodecPreference, ConnectionId, IceServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::frame_sink::FrameSink;

#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(about = "Receive a render stream over WebRTC from a signaling relay")]
struct Cli {
    /// Websocket URL of the signaling relay.
    #[arg(long, env = "TETHER_SERVER", default_value = tether_client::DEFAULT_SERVER_URL)]
    server: String,

    /// Connection id to register with; a random UUID when omitted.
    #[arg(long, env = "TETHER_CONNECTION_ID")]
    connection_id: Option<String>,

    /// STUN/TURN URL. Repeat to add more; replaces the default STUN servers.
    #[arg(long = "ice-server", env = "TETHER_ICE_SERVERS", value_delimiter = ',')]
    ice_servers: Vec<String>,

    #[arg(long, env = "TETHER_CODEC", value_enum, default_value_t = Codec::H264)]
    codec: Codec,

    /// Do not offer on connect; wait for the remote side to offer.
    #[arg(long, env = "TETHER_WAIT_FOR_OFFER")]
    wait_for_offer: bool,

    #[arg(long, env = "TETHER_RECEIVE_AUDIO")]
    receive_audio: bool,

    /// Append the raw frames of every session under this directory.
    #[arg(long, env = "TETHER_SAVE_FRAMES", value_name = "DIR")]
    save_frames: Option<PathBuf>,

    /// Keep running after the last session closes.
    #[arg(long, env = "TETHER_KEEP_ALIVE")]
    keep_alive: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Codec {
    /// Move H.264 and its retransmission types to the front of the video line.
    H264,
    /// Leave the offer as the engine produced it.
    None,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut transport = TransportConfig {
            offer_on_connect: !self.wait_for_offer,
            receive_audio: self.receive_audio,
            ..TransportConfig::default()
        };
        if !self.ice_servers.is_empty() {
            transport.ice_servers = self
                .ice_servers
                .iter()
                .map(|url| IceServerConfig::stun(url.as_str()))
                .collect();
        }

        let codec_preference = match self.codec {
            Codec::H264 => CodecPreference::h264(),
            Codec::None => CodecPreference::none(),
        };

        ClientConfig {
            server_url: self.server.clone(),
            connection_id: self.connection_id.clone().map(ConnectionId::from),
            codec_preference,
            transport,
            exit_on_session_close: !self.keep_alive,
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tether={level},tether_client={level},tether_core={level},webrtc=warn"
        ))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.client_config();

    println!("{}", "Starting tether...".green().bold());
    println!("   Relay: {}", config.server_url.cyan());
    if let Some(dir) = &cli.save_frames {
        println!("   Frames: {}", dir.display());
    }

    let sink = FrameSink::new(cli.save_frames.clone())
        .await
        .context("Failed to prepare the frame directory")?;

    let client = StreamingClient::new(config, Arc::new(sink));
    client
        .run(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted");
            }
        })
        .await
        .context("Streaming client failed")?;

    println!("{}", "Stream finished.".green().bold());
    Ok(())
}
