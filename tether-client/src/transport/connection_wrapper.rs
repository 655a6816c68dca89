use crate::media::{FrameAssembler, MediaKind};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_engine::TransportEngine;
use crate::transport::transport_event::TransportEvent;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tether_core::{
    ConnectionId, ConnectionState, IceCandidateRecord, IceServerConfig, SdpKind,
    SessionDescription, SignalingState,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_remote::TrackRemote;

/// `TransportEngine` backed by a webrtc-rs peer connection.
pub struct WebRtcEngine {
    pub connection_id: ConnectionId,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcEngine {
    /// Builds the peer connection and subscribes to its callbacks once.
    /// `event_tx` receives every callback as a `TransportEvent`.
    pub async fn new(
        connection_id: ConnectionId,
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config.ice_servers.iter().map(rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("failed to create peer connection")?,
        );

        let state_tx = event_tx.clone();
        let id_state = connection_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let id = id_state.clone();

                Box::pin(async move {
                    let Some(state) = connection_state(s) else {
                        return;
                    };
                    info!("Peer connection state for {}: {}", id, state);
                    let _ = tx.send(TransportEvent::ConnectionStateChanged(state)).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let id_ice = connection_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let id = id_ice.clone();

            Box::pin(async move {
                let candidate = match c {
                    Some(candidate) => match local_candidate(&candidate) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!("Dropping local candidate for {}: {:#}", id, e);
                            return;
                        }
                    },
                    None => None,
                };
                let _ = tx.send(TransportEvent::LocalCandidate(candidate)).await;
            })
        }));

        let negotiation_tx = event_tx.clone();
        peer_connection.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                let _ = tx.send(TransportEvent::NegotiationNeeded).await;
            })
        }));

        let dc_tx = event_tx.clone();
        let id_dc = connection_id.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let id = id_dc.clone();

            Box::pin(async move {
                debug!("Remote data channel '{}' for {}", dc.label(), id);
                watch_data_channel(&dc, tx);
            })
        }));

        let track_tx = event_tx.clone();
        let id_track = connection_id.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let tx = track_tx.clone();
            let id = id_track.clone();

            // The read loop gets its own task so the handler returns and the
            // next track can be announced.
            Box::pin(async move {
                tokio::spawn(read_track(track, id, tx));
            })
        }));

        if config.offer_on_connect {
            let dc = peer_connection
                .create_data_channel(&config.data_channel_label, None)
                .await
                .context("failed to create data channel")?;
            watch_data_channel(&dc, event_tx.clone());

            if config.receive_video {
                add_receiver(&peer_connection, RTPCodecType::Video).await?;
            }
            if config.receive_audio {
                add_receiver(&peer_connection, RTPCodecType::Audio).await?;
            }
        }

        Ok(Self {
            connection_id,
            peer_connection,
        })
    }

    async fn rollback_local_offer(&self) -> Result<()> {
        let Some(pending) = self.peer_connection.pending_local_description().await else {
            return Ok(());
        };

        info!("Rolling back local offer for {}", self.connection_id);
        let mut rollback = RTCSessionDescription::default();
        rollback.sdp_type = RTCSdpType::Rollback;
        rollback.sdp = pending.sdp;

        self.peer_connection
            .set_local_description(rollback)
            .await
            .context("failed to roll back local offer")
    }
}

#[async_trait]
impl TransportEngine for WebRtcEngine {
    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("failed to create offer")?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("failed to create answer")?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        let desc = match description.kind {
            SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
        };
        self.peer_connection
            .set_local_description(desc)
            .await
            .context("failed to set local description")
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let desc = match description.kind {
            SdpKind::Offer => {
                if self.peer_connection.signaling_state() == RTCSignalingState::HaveLocalOffer {
                    self.rollback_local_offer().await?;
                }
                RTCSessionDescription::offer(description.sdp)?
            }
            SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
        };
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("failed to set remote description")
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateRecord) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.serialize(),
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("failed to add ICE candidate")
    }

    fn signaling_state(&self) -> SignalingState {
        match self.peer_connection.signaling_state() {
            RTCSignalingState::HaveLocalOffer => SignalingState::HaveLocalOffer,
            RTCSignalingState::HaveRemoteOffer => SignalingState::HaveRemoteOffer,
            RTCSignalingState::HaveLocalPranswer => SignalingState::HaveLocalPranswer,
            RTCSignalingState::HaveRemotePranswer => SignalingState::HaveRemotePranswer,
            RTCSignalingState::Closed => SignalingState::Closed,
            _ => SignalingState::Stable,
        }
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn connection_state(state: RTCPeerConnectionState) -> Option<ConnectionState> {
    match state {
        RTCPeerConnectionState::New => Some(ConnectionState::New),
        RTCPeerConnectionState::Connecting => Some(ConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(ConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(ConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(ConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(ConnectionState::Closed),
        _ => None,
    }
}

fn local_candidate(candidate: &RTCIceCandidate) -> Result<IceCandidateRecord> {
    let init = candidate.to_json()?;
    let record = IceCandidateRecord::parse(&init.candidate)?
        .with_sdp_mid(init.sdp_mid)
        .with_sdp_m_line_index(init.sdp_mline_index);
    Ok(record)
}

async fn add_receiver(peer_connection: &RTCPeerConnection, kind: RTPCodecType) -> Result<()> {
    let init = RTCRtpTransceiverInit {
        direction: RTCRtpTransceiverDirection::Recvonly,
        send_encodings: vec![],
    };
    peer_connection
        .add_transceiver_from_kind(kind, Some(init))
        .await
        .with_context(|| format!("failed to add {kind} receiver"))?;
    Ok(())
}

fn watch_data_channel(dc: &Arc<RTCDataChannel>, tx: mpsc::Sender<TransportEvent>) {
    let label = dc.label().to_owned();

    let tx_open = tx.clone();
    let label_open = label.clone();
    dc.on_open(Box::new(move || {
        let tx = tx_open.clone();
        let label = label_open.clone();
        Box::pin(async move {
            let _ = tx.send(TransportEvent::DataChannelOpen(label)).await;
        })
    }));

    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx.clone();
        let label = label.clone();
        Box::pin(async move {
            let _ = tx.send(TransportEvent::ChannelMessage(label, msg.data)).await;
        })
    }));
}

async fn read_track(
    track: Arc<TrackRemote>,
    connection_id: ConnectionId,
    tx: mpsc::Sender<TransportEvent>,
) {
    let mut assembler = FrameAssembler::new(MediaKind::from(track.kind()));
    info!(
        "Receiving {} track {} (ssrc {}) for {}",
        assembler.kind(),
        track.codec().capability.mime_type,
        track.ssrc(),
        connection_id
    );

    loop {
        match track.read_rtp().await {
            Ok((packet, _)) => {
                let Some(frame) = assembler.push(&packet) else {
                    continue;
                };
                if tx.send(TransportEvent::Frame(frame)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!("Track read ended for {}: {}", connection_id, e);
                break;
            }
        }
    }

    if assembler.dropped() > 0 {
        debug!(
            "{} partial frames dropped on {} track for {}",
            assembler.dropped(),
            assembler.kind(),
            connection_id
        );
    }
}
