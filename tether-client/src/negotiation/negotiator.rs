use crate::negotiation::{MakingOfferGuard, NegotiationState};
use crate::signaling::SignalingOutput;
use crate::transport::TransportEngine;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tether_core::{
    CodecPreference, ConnectionId, ConnectionState, IceCandidateRecord, RemoteCandidate,
    SessionDescription, SignalingState, prefer_codec,
};
use tracing::{debug, error, info, warn};

/// Perfect negotiation for one connection.
///
/// The polite side yields when both sides offer at once: the engine rolls
/// its own offer back and answers the remote one. The impolite side ignores
/// the remote offer and waits for the answer to its own. Handlers run one at
/// a time on the session task, so the collision inputs read at the start of
/// a handler cannot change under it.
pub struct Negotiator {
    connection_id: ConnectionId,
    polite: bool,
    state: NegotiationState,
    ignore_offer: bool,
    has_remote_description: bool,
    pending_candidates: VecDeque<RemoteCandidate>,
    engine: Box<dyn TransportEngine>,
    signaling: Arc<dyn SignalingOutput>,
    codec_preference: CodecPreference,
}

impl Negotiator {
    pub fn new(
        connection_id: ConnectionId,
        polite: bool,
        engine: Box<dyn TransportEngine>,
        signaling: Arc<dyn SignalingOutput>,
        codec_preference: CodecPreference,
    ) -> Self {
        Self {
            connection_id,
            polite,
            state: NegotiationState::Stable,
            ignore_offer: false,
            has_remote_description: false,
            pending_candidates: VecDeque::new(),
            engine,
            signaling,
            codec_preference,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn is_polite(&self) -> bool {
        self.polite
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == NegotiationState::Closed
    }

    pub fn ignore_offer(&self) -> bool {
        self.ignore_offer
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// The engine asked for an offer.
    pub async fn on_negotiation_needed(&mut self) -> Result<()> {
        if self.engine.signaling_state() != SignalingState::Stable {
            debug!(
                "Negotiation for {} deferred: signaling state is {}",
                self.connection_id,
                self.engine.signaling_state()
            );
            return Ok(());
        }

        let state = self.state;
        let Some(_guard) = MakingOfferGuard::enter(&mut self.state) else {
            debug!(
                "Negotiation for {} skipped in state {}",
                self.connection_id, state
            );
            return Ok(());
        };

        send_offer(
            self.engine.as_ref(),
            self.signaling.as_ref(),
            &self.connection_id,
            &self.codec_preference,
        )
        .await
    }

    pub async fn on_remote_offer(&mut self, sdp: String) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        let offer_collision = self.engine.signaling_state() != SignalingState::Stable
            || self.state == NegotiationState::MakingOffer;

        self.ignore_offer = !self.polite && offer_collision;
        if self.ignore_offer {
            info!(
                "Ignoring colliding offer from {} (impolite side keeps its own)",
                self.connection_id
            );
            return Ok(());
        }

        if offer_collision {
            info!(
                "Offer collision on {}, yielding to the remote offer",
                self.connection_id
            );
        }

        self.engine
            .set_remote_description(SessionDescription::offer(sdp))
            .await?;
        self.remote_description_applied().await;

        let answer = self.engine.create_answer().await?;
        self.engine.set_local_description(answer.clone()).await?;
        self.signaling
            .send_answer(self.connection_id.clone(), answer.sdp)
            .await;

        debug!("Answered offer from {}", self.connection_id);
        Ok(())
    }

    pub async fn on_remote_answer(&mut self, sdp: String) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }

        self.engine
            .set_remote_description(SessionDescription::answer(sdp))
            .await?;
        self.ignore_offer = false;
        self.remote_description_applied().await;

        debug!("Applied answer from {}", self.connection_id);
        Ok(())
    }

    /// Remote candidates wait in receipt order until a remote description
    /// has been applied.
    pub async fn on_remote_candidate(&mut self, candidate: RemoteCandidate) {
        if self.is_closed() {
            return;
        }

        if candidate.is_end_of_candidates() {
            debug!("End of remote candidates for {}", self.connection_id);
            return;
        }

        if !self.has_remote_description {
            self.pending_candidates.push_back(candidate);
            debug!(
                "Buffered remote candidate for {} ({} pending)",
                self.connection_id,
                self.pending_candidates.len()
            );
            return;
        }

        self.apply_candidate(candidate).await;
    }

    /// `None` marks the end of local gathering and is not forwarded.
    pub async fn on_local_candidate(&mut self, candidate: Option<IceCandidateRecord>) {
        if self.is_closed() {
            return;
        }

        let Some(candidate) = candidate else {
            debug!("Local candidate gathering complete for {}", self.connection_id);
            return;
        };

        self.signaling
            .send_candidate(self.connection_id.clone(), candidate)
            .await;
    }

    pub async fn on_connection_state(&mut self, state: ConnectionState) {
        if self.is_closed() {
            return;
        }

        if state.is_terminal() {
            info!("Connection {} is {}, closing session", self.connection_id, state);
            self.close().await;
        }
    }

    pub async fn close(&mut self) {
        if self.is_closed() {
            return;
        }

        self.state = NegotiationState::Closed;
        self.pending_candidates.clear();

        if let Err(e) = self.engine.close().await {
            error!("Failed to close engine for {}: {:#}", self.connection_id, e);
        }
    }

    async fn remote_description_applied(&mut self) {
        self.has_remote_description = true;

        while let Some(candidate) = self.pending_candidates.pop_front() {
            self.apply_candidate(candidate).await;
        }
    }

    async fn apply_candidate(&self, candidate: RemoteCandidate) {
        let result = match candidate.parse() {
            Ok(record) => self.engine.add_ice_candidate(record).await,
            Err(e) => Err(e.into()),
        };

        let Err(e) = result else {
            return;
        };

        // Candidates that belong to an ignored offer are expected to fail.
        if self.ignore_offer {
            debug!(
                "Skipping candidate for ignored offer on {}: {:#}",
                self.connection_id, e
            );
        } else {
            warn!(
                "Failed to add ICE candidate for {}: {:#}",
                self.connection_id, e
            );
        }
    }
}

async fn send_offer(
    engine: &dyn TransportEngine,
    signaling: &dyn SignalingOutput,
    connection_id: &ConnectionId,
    codec_preference: &CodecPreference,
) -> Result<()> {
    let offer = engine.create_offer().await?;
    engine
        .set_local_description(offer.clone())
        .await
        .context("failed to apply local offer")?;

    // Only the transmitted copy is reordered; the engine keeps its own offer.
    let sdp = prefer_codec(&offer.sdp, codec_preference);
    signaling.send_offer(connection_id.clone(), sdp).await;

    debug!("Sent offer for {}", connection_id);
    Ok(())
}
